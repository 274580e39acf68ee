use buildout_core::{
    GlobalAssumptions, LaborRate, MileageRate, Project, RateCatalogs, RateId, Selection, Unit,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;

fn build_inputs(n_rates: usize) -> (Project, RateCatalogs) {
    let mut catalogs = RateCatalogs::default();
    let mut project = Project::new("bench", "Bench Ridge");
    project.homes_passed = 2_500;
    project.current_customers = 600;
    for i in 0..n_rates {
        let id = RateId(format!("r{i}"));
        catalogs.units.push(Unit {
            id: id.clone(),
            name: format!("Unit {i}"),
            cost: Decimal::new(125 + i as i64, 2),
            unit_type: "foot".into(),
        });
        catalogs.labor_rates.push(LaborRate {
            id: id.clone(),
            name: format!("Crew {i}"),
            cost: Decimal::new(65, 0),
            rate_type: "hour".into(),
        });
        catalogs.mileage_rates.push(MileageRate {
            id: id.clone(),
            distance: Decimal::new(10 + i as i64, 0),
            cost_per_mile: Decimal::new(67, 2),
        });
        // reverse order so lines must be regrouped by catalog position
        project
            .selected_units
            .insert(0, Selection::new(id.clone(), Decimal::new(1_000, 0)));
        project.selected_labor_rates.push(Selection::new(id.clone(), Decimal::new(8, 0)));
        project.selected_mileage_rates.push(Selection::new(id, Decimal::new(3, 0)));
    }
    (project, catalogs)
}

fn bench_summarize(c: &mut Criterion) {
    let (project, catalogs) = build_inputs(200);
    let assumptions = GlobalAssumptions::default();
    c.bench_function("summarize 200 rates x 3 catalogs", |b| {
        b.iter(|| {
            let _ = black_box(buildout_econ::summarize(&project, &catalogs, &assumptions));
        })
    });
}

criterion_group!(benches, bench_summarize);
criterion_main!(benches);
