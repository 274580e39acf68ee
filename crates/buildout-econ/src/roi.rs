//! Take-rate and payback projection under the current, projected and
//! full-take scenarios.

use crate::{checked_mul, percent_of, round_half_away, EstimateError, HUNDRED};
use buildout_core::{validate_customer_counts, Project, ValidationError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Years until cumulative revenue covers the project cost.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payback {
    Years(Decimal),
    /// No paying customers: the cost is never recovered.
    Never,
}

impl Payback {
    pub fn years(self) -> Option<Decimal> {
        match self {
            Payback::Years(y) => Some(y),
            Payback::Never => None,
        }
    }

    pub fn is_never(self) -> bool {
        matches!(self, Payback::Never)
    }

    /// Float view for charting; `Never` maps to positive infinity.
    pub fn as_f64(self) -> f64 {
        match self {
            Payback::Years(y) => y.to_f64().unwrap_or(f64::INFINITY),
            Payback::Never => f64::INFINITY,
        }
    }
}

/// Take rates, revenue and payback for the three scenarios.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoiResult {
    /// Percent (0-100) of homes passed that pay today.
    pub current_take_rate: Decimal,
    /// Growth applied to the homes-passed base, rounded to whole customers.
    pub projected_new_customers: u64,
    /// Current plus new customers, clipped to homes passed.
    pub total_projected_customers: u64,
    pub projected_take_rate: Decimal,
    /// 100 when any homes are passed, otherwise 0.
    pub full_take_rate: Decimal,
    pub current_monthly_revenue: Decimal,
    pub projected_monthly_revenue: Decimal,
    pub full_take_monthly_revenue: Decimal,
    pub current_roi: Payback,
    pub projected_roi: Payback,
    pub full_take_roi: Payback,
}

/// Years to recover `total_cost` with `customers` paying
/// `monthly_income_per_customer` each month.
///
/// Example:
/// let p = payback(Decimal::new(1200, 0), Decimal::new(10, 0), 10)?;
/// assert_eq!(p, Payback::Years(Decimal::ONE));
pub fn payback(
    total_cost: Decimal,
    monthly_income_per_customer: Decimal,
    customers: u64,
) -> Result<Payback, EstimateError> {
    if customers == 0 {
        return Ok(Payback::Never);
    }
    let monthly = checked_mul(monthly_income_per_customer, Decimal::from(customers))?;
    let yearly = checked_mul(monthly, Decimal::new(12, 0))?;
    if yearly.is_zero() {
        return Ok(Payback::Never);
    }
    let years = total_cost.checked_div(yearly).ok_or(EstimateError::Overflow)?;
    Ok(Payback::Years(years))
}

fn new_customers(homes_passed: u64, growth_pct: Decimal) -> Result<u64, EstimateError> {
    let raw = checked_mul(Decimal::from(homes_passed), growth_pct)? / HUNDRED;
    Ok(round_half_away(raw).to_u64().unwrap_or(u64::MAX))
}

/// Project take rates and payback for a project costing `total_cost`.
///
/// Growth is a percentage of homes passed (not of current customers). The
/// projected customer count never exceeds homes passed.
pub fn project_roi(
    project: &Project,
    total_cost: Decimal,
    monthly_income_per_customer: Decimal,
    projected_growth_percentage: Decimal,
) -> Result<RoiResult, EstimateError> {
    validate_customer_counts(project)?;
    if total_cost < Decimal::ZERO {
        return Err(ValidationError::NegativeTotalCost(total_cost).into());
    }
    if monthly_income_per_customer <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveIncome(monthly_income_per_customer).into());
    }
    if projected_growth_percentage < Decimal::ZERO {
        return Err(ValidationError::NegativeGrowth(projected_growth_percentage).into());
    }

    let homes = project.homes_passed;
    let current = project.current_customers;
    let homes_dec = Decimal::from(homes);

    let projected_new_customers = new_customers(homes, projected_growth_percentage)?;
    let total_projected_customers = current.saturating_add(projected_new_customers).min(homes);
    debug!(
        project = %project.id,
        projected_new_customers,
        total_projected_customers,
        "projected customers"
    );

    let revenue = |c: u64| checked_mul(monthly_income_per_customer, Decimal::from(c));

    Ok(RoiResult {
        current_take_rate: percent_of(Decimal::from(current), homes_dec)?,
        projected_new_customers,
        total_projected_customers,
        projected_take_rate: percent_of(Decimal::from(total_projected_customers), homes_dec)?,
        full_take_rate: percent_of(homes_dec, homes_dec)?,
        current_monthly_revenue: revenue(current)?,
        projected_monthly_revenue: revenue(total_projected_customers)?,
        full_take_monthly_revenue: revenue(homes)?,
        current_roi: payback(total_cost, monthly_income_per_customer, current)?,
        projected_roi: payback(
            total_cost,
            monthly_income_per_customer,
            total_projected_customers,
        )?,
        full_take_roi: payback(total_cost, monthly_income_per_customer, homes)?,
    })
}
