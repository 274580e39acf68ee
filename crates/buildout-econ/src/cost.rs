//! Cost aggregation: selections priced against the rate catalogs.

use crate::{checked_add, checked_mul, percent_of, EstimateError};
use buildout_core::{
    validate_catalogs, validate_selections_and_counts, Project, RateCatalogs, RateCategory,
    RateEntry, RateId, Selection,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// One priced selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub rate_id: RateId,
    pub name: String,
    #[serde(rename = "type")]
    pub line_type: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    /// Always exactly `quantity * unit_cost`.
    pub total: Decimal,
}

/// Share of the total cost taken by one category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostShare {
    pub category: RateCategory,
    pub value: Decimal,
    /// Percentage of the project total, 0 when the total is 0.
    pub percent: Decimal,
}

/// Itemized and summed costs of a project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub unit_costs: Vec<CostLine>,
    pub labor_costs: Vec<CostLine>,
    pub mileage_costs: Vec<CostLine>,
    pub total_units_cost: Decimal,
    pub total_labor_cost: Decimal,
    pub total_mileage_cost: Decimal,
    pub total_cost: Decimal,
    /// `total_cost / homes_passed`, or 0 when no homes are passed.
    pub cost_per_home: Decimal,
}

impl CostBreakdown {
    pub fn lines(&self, category: RateCategory) -> &[CostLine] {
        match category {
            RateCategory::Units => &self.unit_costs,
            RateCategory::Labor => &self.labor_costs,
            RateCategory::Mileage => &self.mileage_costs,
        }
    }

    pub fn category_total(&self, category: RateCategory) -> Decimal {
        match category {
            RateCategory::Units => self.total_units_cost,
            RateCategory::Labor => self.total_labor_cost,
            RateCategory::Mileage => self.total_mileage_cost,
        }
    }

    /// Per-category shares of the total, in category order.
    pub fn distribution(&self) -> Result<Vec<CostShare>, EstimateError> {
        RateCategory::ALL
            .iter()
            .map(|&category| {
                let value = self.category_total(category);
                Ok(CostShare {
                    category,
                    value,
                    percent: percent_of(value, self.total_cost)?,
                })
            })
            .collect()
    }
}

/// Price every active selection of one category. Lines come out in catalog
/// order, not selection order.
fn price_category<E: RateEntry>(
    category: RateCategory,
    catalog: &[E],
    selections: &[Selection],
) -> Result<(Vec<CostLine>, Decimal), EstimateError> {
    let index: HashMap<&RateId, usize> = catalog
        .iter()
        .enumerate()
        .map(|(pos, e)| (e.id(), pos))
        .collect();

    let mut by_entry: Vec<Vec<&Selection>> = vec![Vec::new(); catalog.len()];
    for sel in selections.iter().filter(|s| s.is_active()) {
        let pos = index
            .get(&sel.rate_id)
            .ok_or_else(|| EstimateError::UnknownRate {
                category,
                id: sel.rate_id.clone(),
            })?;
        by_entry[*pos].push(sel);
    }

    let mut lines = Vec::new();
    let mut total = Decimal::ZERO;
    for (entry, sels) in catalog.iter().zip(&by_entry) {
        for sel in sels {
            let unit_cost = entry.unit_cost();
            let line_total = checked_mul(sel.quantity, unit_cost)?;
            total = checked_add(total, line_total)?;
            lines.push(CostLine {
                rate_id: entry.id().clone(),
                name: entry.line_name(),
                line_type: entry.line_type().to_string(),
                quantity: sel.quantity,
                unit_cost,
                total: line_total,
            });
        }
    }
    debug!(%category, lines = lines.len(), %total, "priced category");
    Ok((lines, total))
}

/// Compute itemized and total costs of a project.
///
/// Fails with [`EstimateError::UnknownRate`] if any active selection names a
/// rate missing from its catalog; a partial total is never returned.
///
/// Example:
/// let costs = aggregate(&project, &catalogs)?;
/// assert!(costs.total_cost >= costs.total_units_cost);
pub fn aggregate(
    project: &Project,
    catalogs: &RateCatalogs,
) -> Result<CostBreakdown, EstimateError> {
    validate_selections_and_counts(project)?;
    validate_catalogs(catalogs)?;

    let (unit_costs, total_units_cost) =
        price_category(RateCategory::Units, &catalogs.units, &project.selected_units)?;
    let (labor_costs, total_labor_cost) = price_category(
        RateCategory::Labor,
        &catalogs.labor_rates,
        &project.selected_labor_rates,
    )?;
    let (mileage_costs, total_mileage_cost) = price_category(
        RateCategory::Mileage,
        &catalogs.mileage_rates,
        &project.selected_mileage_rates,
    )?;

    let total_cost = checked_add(
        checked_add(total_units_cost, total_labor_cost)?,
        total_mileage_cost,
    )?;
    let cost_per_home = if project.homes_passed > 0 {
        total_cost / Decimal::from(project.homes_passed)
    } else {
        Decimal::ZERO
    };

    Ok(CostBreakdown {
        unit_costs,
        labor_costs,
        mileage_costs,
        total_units_cost,
        total_labor_cost,
        total_mileage_cost,
        total_cost,
        cost_per_home,
    })
}
