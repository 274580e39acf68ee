#![deny(warnings)]

//! Cost aggregation and ROI projection for buildout projects.
//!
//! This crate provides two pure, stateless calculations:
//! - [`aggregate`]: prices a project's selections against the rate catalogs
//! - [`project_roi`]: derives take rates and years-to-payback for the current,
//!   projected and full-take scenarios
//!
//! All figures are exact [`Decimal`] values; rounding for display is left to
//! the caller. [`summarize`] runs both steps in order.

use buildout_core::{
    validate_assumptions, GlobalAssumptions, Project, RateCatalogs, RateCategory, RateId,
    ValidationError,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod cost;
mod roi;

pub use cost::{aggregate, CostBreakdown, CostLine, CostShare};
pub use roi::{payback, project_roi, Payback, RoiResult};

/// Errors produced by the estimation engine.
#[derive(Debug, Error, PartialEq)]
pub enum EstimateError {
    /// A selection points at a rate id missing from its catalog.
    #[error("{category} selection references unknown rate id: {id}")]
    UnknownRate { category: RateCategory, id: RateId },
    /// Input rejected by validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// Decimal arithmetic exceeded the representable range.
    #[error("decimal arithmetic overflow")]
    Overflow,
}

/// Cost breakdown and ROI projection for one project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub costs: CostBreakdown,
    pub roi: RoiResult,
}

/// Price a project and project its return under the given assumptions.
pub fn summarize(
    project: &Project,
    catalogs: &RateCatalogs,
    assumptions: &GlobalAssumptions,
) -> Result<ProjectSummary, EstimateError> {
    validate_assumptions(assumptions)?;
    let costs = aggregate(project, catalogs)?;
    let roi = project_roi(
        project,
        costs.total_cost,
        assumptions.monthly_income_per_customer,
        assumptions.projected_growth_percentage,
    )?;
    Ok(ProjectSummary { costs, roi })
}

pub(crate) const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

pub(crate) fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, EstimateError> {
    a.checked_mul(b).ok_or(EstimateError::Overflow)
}

pub(crate) fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, EstimateError> {
    a.checked_add(b).ok_or(EstimateError::Overflow)
}

/// `part / whole * 100`, or zero when `whole` is zero.
pub fn percent_of(part: Decimal, whole: Decimal) -> Result<Decimal, EstimateError> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let ratio = part.checked_div(whole).ok_or(EstimateError::Overflow)?;
    checked_mul(ratio, HUNDRED)
}

/// Round to a whole number, halves away from zero (2.5 -> 3, -2.5 -> -3).
pub fn round_half_away(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
