#![deny(warnings)]

//! Headless CLI: prices a buildout project and prints its ROI summary.

mod report;

use anyhow::{bail, Context, Result};
use buildout_core::{
    validate_assumptions, validate_project, GlobalAssumptions, LaborRate, MileageRate, Project,
    RateCatalogs, RateId, Selection, Unit,
};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// A project file: the rate catalogs and the project priced against them.
#[derive(Debug, Serialize, Deserialize)]
struct ProjectFile {
    catalogs: RateCatalogs,
    project: Project,
}

#[derive(Debug, Default)]
struct Args {
    project: Option<PathBuf>,
    assumptions: Option<PathBuf>,
    json: bool,
    version: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--project" => {
                out.project = Some(it.next().context("--project needs a path")?.into());
            }
            "--assumptions" => {
                out.assumptions = Some(it.next().context("--assumptions needs a path")?.into());
            }
            "--json" => out.json = true,
            "--version" => out.version = true,
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(out)
}

/// Load YAML or JSON, picked by file extension.
fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let doc = if is_json {
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
    } else {
        serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
    };
    Ok(doc)
}

fn sample_project() -> ProjectFile {
    let catalogs = RateCatalogs {
        units: vec![
            Unit {
                id: RateId::from("drop-cable"),
                name: "Drop cable".to_string(),
                cost: Decimal::new(45, 2),
                unit_type: "foot".to_string(),
            },
            Unit {
                id: RateId::from("ont"),
                name: "ONT".to_string(),
                cost: Decimal::new(185, 0),
                unit_type: "each".to_string(),
            },
        ],
        labor_rates: vec![LaborRate {
            id: RateId::from("splicer"),
            name: "Splicing technician".to_string(),
            cost: Decimal::new(85, 0),
            rate_type: "hour".to_string(),
        }],
        mileage_rates: vec![MileageRate {
            id: RateId::from("local"),
            distance: Decimal::new(25, 0),
            cost_per_mile: Decimal::new(67, 2),
        }],
    };
    let mut project = Project::new("sample", "Sample Subdivision");
    project.homes_passed = 120;
    project.current_customers = 30;
    project.selected_units = vec![
        Selection::new("drop-cable", Decimal::new(6_000, 0)),
        Selection::new("ont", Decimal::new(30, 0)),
    ];
    project.selected_labor_rates = vec![Selection::new("splicer", Decimal::new(40, 0))];
    project.selected_mileage_rates = vec![Selection::new("local", Decimal::new(6, 0))];
    ProjectFile { catalogs, project }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.version {
        println!(
            "buildout {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    info!(project = ?args.project, assumptions = ?args.assumptions, "starting CLI");

    let file = match &args.project {
        Some(path) => load_document::<ProjectFile>(path)?,
        None => sample_project(),
    };
    let assumptions = match &args.assumptions {
        Some(path) => load_document::<GlobalAssumptions>(path)?,
        None => GlobalAssumptions::default(),
    };
    validate_assumptions(&assumptions).context("invalid assumptions")?;
    validate_project(&file.project).context("invalid project")?;

    let summary = buildout_econ::summarize(&file.project, &file.catalogs, &assumptions)
        .with_context(|| format!("estimating project {}", file.project.id))?;
    info!(
        project = %file.project.id,
        total_cost = %summary.costs.total_cost,
        "estimate complete"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", report::render_text(&file.project, &assumptions, &summary)?);
    }
    Ok(())
}
