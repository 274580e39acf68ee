//! Plain-text rendering of a project summary.

use anyhow::{Context, Result};
use buildout_core::{GlobalAssumptions, Project, RateCategory};
use buildout_econ::{CostLine, Payback, ProjectSummary};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;

fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// `$1,234.50`
pub fn money(value: Decimal) -> String {
    let rounded = format!("{:.2}", round(value, 2));
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{frac_part}")
}

/// `70.0%`
pub fn percent(value: Decimal) -> String {
    format!("{:.1}%", round(value, 1))
}

/// `1.3 years`, or `never` without paying customers.
pub fn payback(value: Payback) -> String {
    match value {
        Payback::Years(y) => format!("{:.1} years", round(y, 1)),
        Payback::Never => "never".to_string(),
    }
}

fn quantity_label(category: RateCategory, line: &CostLine) -> String {
    let qty = line.quantity.normalize();
    match category {
        RateCategory::Units => format!("{qty} {}", line.line_type),
        RateCategory::Labor => format!("{qty} {}s", line.line_type),
        RateCategory::Mileage => format!("{qty} trips"),
    }
}

/// Render the summary page for a project.
pub fn render_text(
    project: &Project,
    assumptions: &GlobalAssumptions,
    summary: &ProjectSummary,
) -> Result<String> {
    let mut out = String::new();
    write_page(&mut out, project, assumptions, summary)?;
    Ok(out)
}

fn write_page<W: Write>(
    out: &mut W,
    project: &Project,
    assumptions: &GlobalAssumptions,
    summary: &ProjectSummary,
) -> Result<()> {
    let costs = &summary.costs;
    let roi = &summary.roi;

    writeln!(out, "{}", project.name)?;
    if let Some(notes) = project.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        writeln!(out, "{notes}")?;
    }
    writeln!(out)?;
    writeln!(out, "Total Cost            {}", money(costs.total_cost))?;
    writeln!(out, "Cost per Home         {}", money(costs.cost_per_home))?;
    writeln!(out, "Current Take Rate     {}", percent(roi.current_take_rate))?;
    writeln!(out, "Projected Take Rate   {}", percent(roi.projected_take_rate))?;

    writeln!(out, "\nTake Rate Analysis")?;
    writeln!(
        out,
        "  Current customers   {} homes ({})",
        project.current_customers,
        percent(roi.current_take_rate)
    )?;
    writeln!(
        out,
        "  Projected growth    +{} homes ({} -> {})",
        roi.projected_new_customers,
        roi.total_projected_customers,
        percent(roi.projected_take_rate)
    )?;

    writeln!(out, "\nROI Analysis")?;
    let scenarios = [
        ("Current", project.current_customers, roi.current_roi, roi.current_monthly_revenue),
        (
            "Projected",
            roi.total_projected_customers,
            roi.projected_roi,
            roi.projected_monthly_revenue,
        ),
        ("Full Take", project.homes_passed, roi.full_take_roi, roi.full_take_monthly_revenue),
    ];
    for (label, customers, years, revenue) in scenarios {
        writeln!(
            out,
            "  {label:<10} {:>12}  {customers} customers, {}/month",
            payback(years),
            money(revenue)
        )?;
    }
    writeln!(
        out,
        "  (at {} per customer per month)",
        money(assumptions.monthly_income_per_customer)
    )?;

    writeln!(out, "\nCost Distribution")?;
    let shares = costs.distribution().context("computing cost distribution")?;
    for share in shares {
        writeln!(
            out,
            "  {:<22} {:>14}  {:.0}%",
            share.category.label(),
            money(share.value),
            round(share.percent, 0)
        )?;
    }

    writeln!(out, "\nCost Breakdown")?;
    for category in RateCategory::ALL {
        writeln!(out, "  {}", category.label())?;
        let lines = costs.lines(category);
        if lines.is_empty() {
            writeln!(out, "    (none)")?;
        }
        for line in lines {
            let rate = match category {
                RateCategory::Mileage => format!("{}/mile", money(line.unit_cost)),
                _ => money(line.unit_cost),
            };
            writeln!(
                out,
                "    {:<24} {:>14} @ {:<12} {:>14}",
                line.name,
                quantity_label(category, line),
                rate,
                money(line.total)
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildout_core::{RateCatalogs, RateId, Selection, Unit};

    #[test]
    fn money_groups_thousands_and_rounds() {
        assert_eq!(money(Decimal::new(123456789, 2)), "$1,234,567.89");
        assert_eq!(money(Decimal::new(5, 0)), "$5.00");
        assert_eq!(money(Decimal::new(100_000, 0)), "$100,000.00");
        assert_eq!(money(Decimal::new(1005, 3)), "$1.01");
        assert_eq!(money(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn percent_and_payback_format() {
        assert_eq!(percent(Decimal::new(70, 0)), "70.0%");
        assert_eq!(percent(Decimal::new(33_333, 3)), "33.3%");
        assert_eq!(payback(Payback::Years(Decimal::new(6675, 4))), "0.7 years");
        assert_eq!(payback(Payback::Never), "never");
    }

    fn priced_summary() -> (Project, ProjectSummary) {
        let catalogs = RateCatalogs {
            units: vec![Unit {
                id: RateId::from("u1"),
                name: "Drop cable".into(),
                cost: Decimal::new(45, 2),
                unit_type: "foot".into(),
            }],
            ..Default::default()
        };
        let mut project = Project::new("p1", "Elm Row");
        project.homes_passed = 10;
        project.current_customers = 2;
        project.selected_units.push(Selection::new("u1", Decimal::new(1_000, 0)));
        let summary =
            buildout_econ::summarize(&project, &catalogs, &GlobalAssumptions::default()).unwrap();
        (project, summary)
    }

    #[test]
    fn page_lists_distribution_and_lines() {
        let (project, summary) = priced_summary();
        let text = render_text(&project, &GlobalAssumptions::default(), &summary).unwrap();
        assert!(text.contains("Materials & Equipment"));
        assert!(text.contains("$450.00  100%"));
        assert!(text.contains("1000 foot"));
    }

    #[test]
    fn distribution_overflow_is_reported() {
        let (project, mut summary) = priced_summary();
        summary.costs.total_units_cost = Decimal::MAX;
        summary.costs.total_cost = Decimal::new(1, 20);
        let err = render_text(&project, &GlobalAssumptions::default(), &summary).unwrap_err();
        assert!(err.to_string().contains("cost distribution"));
    }
}
