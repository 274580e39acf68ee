#![deny(warnings)]

//! Core domain records and invariants for the buildout estimator.
//!
//! This crate defines the serializable inputs of the estimation engine (rate
//! catalogs, project selections, global assumptions) together with validation
//! helpers that reject nonsensical input before any cost is computed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Identifier of a rate catalog entry, e.g. "u1" or "labor-splicer".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RateId(pub String);

impl RateId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RateId {
    fn from(s: &str) -> Self {
        RateId(s.to_string())
    }
}

/// The three priced categories a project draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateCategory {
    /// Materials and equipment priced per unit of measure.
    Units,
    /// Labor priced per hour (or other labor unit).
    Labor,
    /// Travel priced per mile, selected by number of trips.
    Mileage,
}

impl RateCategory {
    pub const ALL: [RateCategory; 3] = [Self::Units, Self::Labor, Self::Mileage];

    /// Human-readable heading used by reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Units => "Materials & Equipment",
            Self::Labor => "Labor",
            Self::Mileage => "Mileage",
        }
    }
}

impl fmt::Display for RateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Units => "units",
            Self::Labor => "labor",
            Self::Mileage => "mileage",
        };
        f.write_str(s)
    }
}

/// A priced material or piece of equipment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: RateId,
    pub name: String,
    /// Cost in currency per unit of measure.
    pub cost: Decimal,
    /// Unit of measure, e.g. "foot" or "each".
    #[serde(rename = "type")]
    pub unit_type: String,
}

/// A priced labor rate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaborRate {
    pub id: RateId,
    pub name: String,
    /// Cost in currency per labor unit.
    pub cost: Decimal,
    /// Labor unit, usually "hour".
    #[serde(rename = "type")]
    pub rate_type: String,
}

/// A travel bucket: a fixed distance per trip billed per mile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MileageRate {
    pub id: RateId,
    /// Miles per trip.
    pub distance: Decimal,
    pub cost_per_mile: Decimal,
}

/// Common view over catalog entries, used to turn a selection into a cost line.
pub trait RateEntry {
    fn id(&self) -> &RateId;
    /// Name shown on the cost line.
    fn line_name(&self) -> String;
    /// Unit of measure shown on the cost line.
    fn line_type(&self) -> &str;
    /// Price of one unit of quantity.
    fn unit_cost(&self) -> Decimal;
}

impl RateEntry for Unit {
    fn id(&self) -> &RateId {
        &self.id
    }
    fn line_name(&self) -> String {
        self.name.clone()
    }
    fn line_type(&self) -> &str {
        &self.unit_type
    }
    fn unit_cost(&self) -> Decimal {
        self.cost
    }
}

impl RateEntry for LaborRate {
    fn id(&self) -> &RateId {
        &self.id
    }
    fn line_name(&self) -> String {
        self.name.clone()
    }
    fn line_type(&self) -> &str {
        &self.rate_type
    }
    fn unit_cost(&self) -> Decimal {
        self.cost
    }
}

impl RateEntry for MileageRate {
    fn id(&self) -> &RateId {
        &self.id
    }
    fn line_name(&self) -> String {
        format!("{} miles", self.distance.normalize())
    }
    fn line_type(&self) -> &str {
        "mile"
    }
    fn unit_cost(&self) -> Decimal {
        self.cost_per_mile
    }
}

/// The three ordered rate catalogs supplied by the catalog provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RateCatalogs {
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub labor_rates: Vec<LaborRate>,
    #[serde(default)]
    pub mileage_rates: Vec<MileageRate>,
}

/// A chosen quantity of one catalog entry. For mileage the quantity is the
/// number of trips.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub rate_id: RateId,
    #[serde(alias = "trips")]
    pub quantity: Decimal,
}

impl Selection {
    pub fn new(rate_id: impl Into<RateId>, quantity: Decimal) -> Self {
        Self {
            rate_id: rate_id.into(),
            quantity,
        }
    }

    /// Build a selection from a possibly blank form input; blank means 0.
    pub fn from_input(rate_id: impl Into<RateId>, quantity: Option<Decimal>) -> Self {
        Self::new(rate_id, quantity.unwrap_or(Decimal::ZERO))
    }

    /// A zero quantity is equivalent to not selecting the entry at all.
    pub fn is_active(&self) -> bool {
        self.quantity > Decimal::ZERO
    }
}

/// A buildout project: its addressable market and its selected costs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Total addressable homes within the build footprint.
    pub homes_passed: u64,
    /// Paying customers today; must not exceed `homes_passed`.
    pub current_customers: u64,
    #[serde(default)]
    pub selected_units: Vec<Selection>,
    #[serde(default)]
    pub selected_labor_rates: Vec<Selection>,
    #[serde(default)]
    pub selected_mileage_rates: Vec<Selection>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image_url: None,
            notes: None,
            homes_passed: 0,
            current_customers: 0,
            selected_units: vec![],
            selected_labor_rates: vec![],
            selected_mileage_rates: vec![],
        }
    }

    pub fn selections(&self, category: RateCategory) -> &[Selection] {
        match category {
            RateCategory::Units => &self.selected_units,
            RateCategory::Labor => &self.selected_labor_rates,
            RateCategory::Mileage => &self.selected_mileage_rates,
        }
    }

    fn selections_mut(&mut self, category: RateCategory) -> &mut Vec<Selection> {
        match category {
            RateCategory::Units => &mut self.selected_units,
            RateCategory::Labor => &mut self.selected_labor_rates,
            RateCategory::Mileage => &mut self.selected_mileage_rates,
        }
    }

    /// Insert, update or (for a zero quantity) remove the selection of `rate_id`.
    pub fn set_quantity(&mut self, category: RateCategory, rate_id: &RateId, quantity: Decimal) {
        let list = self.selections_mut(category);
        if quantity.is_zero() {
            list.retain(|s| &s.rate_id != rate_id);
            return;
        }
        match list.iter_mut().find(|s| &s.rate_id == rate_id) {
            Some(sel) => sel.quantity = quantity,
            None => list.push(Selection::new(rate_id.clone(), quantity)),
        }
    }

    pub fn set_unit_quantity(&mut self, rate_id: &RateId, quantity: Decimal) {
        self.set_quantity(RateCategory::Units, rate_id, quantity);
    }

    pub fn set_labor_quantity(&mut self, rate_id: &RateId, quantity: Decimal) {
        self.set_quantity(RateCategory::Labor, rate_id, quantity);
    }

    pub fn set_mileage_trips(&mut self, rate_id: &RateId, trips: Decimal) {
        self.set_quantity(RateCategory::Mileage, rate_id, trips);
    }
}

/// The two tunable global assumptions behind the ROI projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalAssumptions {
    /// Monthly revenue per paying customer (> 0).
    pub monthly_income_per_customer: Decimal,
    /// Growth as a percentage of homes passed (>= 0, e.g. 10 = 10%).
    pub projected_growth_percentage: Decimal,
}

impl Default for GlobalAssumptions {
    fn default() -> Self {
        Self {
            monthly_income_per_customer: Decimal::new(50, 0),
            projected_growth_percentage: Decimal::new(10, 0),
        }
    }
}

/// Validation errors for engine inputs.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Project name must not be blank.
    #[error("project name must not be empty")]
    EmptyName,
    /// Selected quantities (or trips) must be non-negative.
    #[error("negative quantity {quantity} selected for {category} rate {id}")]
    NegativeQuantity {
        category: RateCategory,
        id: RateId,
        quantity: Decimal,
    },
    /// Catalog ids must be unique within their catalog.
    #[error("duplicate {category} rate id: {id}")]
    DuplicateRateId { category: RateCategory, id: RateId },
    /// Catalog costs and distances must be non-negative.
    #[error("negative price or distance on {category} rate {id}")]
    NegativeRate { category: RateCategory, id: RateId },
    /// Take rate above 100% is nonsensical.
    #[error("current customers ({current}) exceed homes passed ({homes})")]
    CustomersExceedHomes { current: u64, homes: u64 },
    /// A project cost handed to the projector must be non-negative.
    #[error("total cost must be >= 0, got {0}")]
    NegativeTotalCost(Decimal),
    /// Revenue per customer must be strictly positive.
    #[error("monthly income per customer must be > 0, got {0}")]
    NonPositiveIncome(Decimal),
    /// Growth percentage must be non-negative.
    #[error("projected growth percentage must be >= 0, got {0}")]
    NegativeGrowth(Decimal),
}

fn validate_selections(
    category: RateCategory,
    selections: &[Selection],
) -> Result<(), ValidationError> {
    for s in selections {
        if s.quantity < Decimal::ZERO {
            return Err(ValidationError::NegativeQuantity {
                category,
                id: s.rate_id.clone(),
                quantity: s.quantity,
            });
        }
    }
    Ok(())
}

/// Validate that a project's take rate cannot exceed 100%.
pub fn validate_customer_counts(p: &Project) -> Result<(), ValidationError> {
    if p.current_customers > p.homes_passed {
        return Err(ValidationError::CustomersExceedHomes {
            current: p.current_customers,
            homes: p.homes_passed,
        });
    }
    Ok(())
}

/// Validate what the cost engine reads from a project: customer counts and
/// selected quantities. Descriptive fields (name, notes, image) are ignored.
pub fn validate_selections_and_counts(p: &Project) -> Result<(), ValidationError> {
    validate_customer_counts(p)?;
    for category in RateCategory::ALL {
        validate_selections(category, p.selections(category))?;
    }
    Ok(())
}

/// Validate a whole project record as entered: a non-blank name plus
/// everything [`validate_selections_and_counts`] checks.
pub fn validate_project(p: &Project) -> Result<(), ValidationError> {
    if p.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    validate_selections_and_counts(p)
}

fn validate_catalog<E: RateEntry>(
    category: RateCategory,
    entries: &[E],
) -> Result<(), ValidationError> {
    let mut ids: BTreeSet<&RateId> = BTreeSet::new();
    for e in entries {
        if !ids.insert(e.id()) {
            return Err(ValidationError::DuplicateRateId {
                category,
                id: e.id().clone(),
            });
        }
        if e.unit_cost() < Decimal::ZERO {
            return Err(ValidationError::NegativeRate {
                category,
                id: e.id().clone(),
            });
        }
    }
    Ok(())
}

/// Validate the three catalogs: unique ids and non-negative prices.
pub fn validate_catalogs(c: &RateCatalogs) -> Result<(), ValidationError> {
    validate_catalog(RateCategory::Units, &c.units)?;
    validate_catalog(RateCategory::Labor, &c.labor_rates)?;
    validate_catalog(RateCategory::Mileage, &c.mileage_rates)?;
    for m in &c.mileage_rates {
        if m.distance < Decimal::ZERO {
            return Err(ValidationError::NegativeRate {
                category: RateCategory::Mileage,
                id: m.id.clone(),
            });
        }
    }
    Ok(())
}

/// Validate the global assumptions.
pub fn validate_assumptions(a: &GlobalAssumptions) -> Result<(), ValidationError> {
    if a.monthly_income_per_customer <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveIncome(a.monthly_income_per_customer));
    }
    if a.projected_growth_percentage < Decimal::ZERO {
        return Err(ValidationError::NegativeGrowth(a.projected_growth_percentage));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn project() -> Project {
        let mut p = Project::new("p1", "Main Street");
        p.homes_passed = 100;
        p.current_customers = 20;
        p
    }

    #[test]
    fn mileage_line_name_uses_distance() {
        let m = MileageRate {
            id: RateId::from("m1"),
            distance: Decimal::new(250, 1), // 25.0
            cost_per_mile: Decimal::new(65, 2),
        };
        assert_eq!(m.line_name(), "25 miles");
        assert_eq!(m.line_type(), "mile");
        assert_eq!(m.unit_cost(), Decimal::new(65, 2));
    }

    #[test]
    fn blank_input_is_zero_quantity() {
        let s = Selection::from_input("u1", None);
        assert_eq!(s.quantity, Decimal::ZERO);
        assert!(!s.is_active());
        assert!(Selection::from_input("u1", Some(Decimal::ONE)).is_active());
    }

    #[test]
    fn set_quantity_upserts_and_removes() {
        let mut p = project();
        let id = RateId::from("u1");
        p.set_unit_quantity(&id, Decimal::new(5, 0));
        p.set_unit_quantity(&id, Decimal::new(7, 0));
        assert_eq!(p.selected_units, vec![Selection::new("u1", Decimal::new(7, 0))]);
        p.set_mileage_trips(&RateId::from("m1"), Decimal::new(3, 0));
        assert_eq!(p.selected_mileage_rates.len(), 1);
        p.set_unit_quantity(&id, Decimal::ZERO);
        assert!(p.selected_units.is_empty());
    }

    #[test]
    fn rejects_customers_above_homes() {
        let mut p = project();
        p.current_customers = 101;
        assert_eq!(
            validate_project(&p),
            Err(ValidationError::CustomersExceedHomes {
                current: 101,
                homes: 100
            })
        );
    }

    #[test]
    fn rejects_negative_quantity_with_context() {
        let mut p = project();
        p.selected_labor_rates.push(Selection::new("l1", Decimal::new(-1, 0)));
        match validate_project(&p) {
            Err(ValidationError::NegativeQuantity { category, id, .. }) => {
                assert_eq!(category, RateCategory::Labor);
                assert_eq!(id.as_str(), "l1");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_blank_name() {
        let mut p = project();
        p.name = "  ".into();
        assert_eq!(validate_project(&p), Err(ValidationError::EmptyName));
        assert_eq!(validate_selections_and_counts(&p), Ok(()));
    }

    #[test]
    fn rejects_negative_unit_cost() {
        let catalogs = RateCatalogs {
            units: vec![Unit {
                id: RateId::from("u1"),
                name: "Fiber".into(),
                cost: Decimal::new(-125, 2),
                unit_type: "foot".into(),
            }],
            ..Default::default()
        };
        assert_eq!(
            validate_catalogs(&catalogs),
            Err(ValidationError::NegativeRate {
                category: RateCategory::Units,
                id: RateId::from("u1"),
            })
        );
    }

    #[test]
    fn rejects_negative_mileage_distance() {
        let catalogs = RateCatalogs {
            mileage_rates: vec![MileageRate {
                id: RateId::from("m1"),
                distance: Decimal::new(-10, 0),
                cost_per_mile: Decimal::new(67, 2),
            }],
            ..Default::default()
        };
        assert_eq!(
            validate_catalogs(&catalogs),
            Err(ValidationError::NegativeRate {
                category: RateCategory::Mileage,
                id: RateId::from("m1"),
            })
        );
    }

    #[test]
    fn rejects_duplicate_catalog_ids() {
        let unit = Unit {
            id: RateId::from("u1"),
            name: "Fiber".into(),
            cost: Decimal::ONE,
            unit_type: "foot".into(),
        };
        let catalogs = RateCatalogs {
            units: vec![unit.clone(), unit],
            ..Default::default()
        };
        assert!(matches!(
            validate_catalogs(&catalogs),
            Err(ValidationError::DuplicateRateId { .. })
        ));
    }

    #[test]
    fn assumptions_bounds() {
        assert!(validate_assumptions(&GlobalAssumptions::default()).is_ok());
        let zero_income = GlobalAssumptions {
            monthly_income_per_customer: Decimal::ZERO,
            ..Default::default()
        };
        assert!(validate_assumptions(&zero_income).is_err());
        let no_growth = GlobalAssumptions {
            projected_growth_percentage: Decimal::ZERO,
            ..Default::default()
        };
        assert!(validate_assumptions(&no_growth).is_ok());
    }

    #[test]
    fn serde_roundtrip_project_with_trips_alias() {
        let json = r#"{
            "id": "p9",
            "name": "Ridge Road",
            "homes_passed": 40,
            "current_customers": 4,
            "selected_mileage_rates": [{"rate_id": "m1", "trips": 6}]
        }"#;
        let p: Project = serde_json::from_str(json).unwrap();
        assert_eq!(p.selected_mileage_rates[0].quantity, Decimal::new(6, 0));
        assert!(p.image_url.is_none());
        let back: Project = serde_json::from_str(&serde_json::to_string(&p).unwrap()).unwrap();
        assert_eq!(back, p);
    }

    proptest! {
        #[test]
        fn customers_within_homes_validate(homes in 0u64..1_000_000, frac in 0.0f64..=1.0) {
            let mut p = project();
            p.homes_passed = homes;
            p.current_customers = ((homes as f64) * frac).floor() as u64;
            prop_assert!(validate_project(&p).is_ok());
        }
    }
}
