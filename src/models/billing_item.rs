//! Billing line-item models.
//!
//! This module contains the [`BillingItem`] input type as supplied by the
//! caller (an invoice's raw line items), the [`ServiceCategory`] taxonomy,
//! and the [`NormalizedItem`] form the engine actually calculates on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The service category of a billable clinical item.
///
/// Coverage rules in a convention are keyed by category.
///
/// # Example
///
/// ```
/// use convention_engine::models::ServiceCategory;
///
/// let category = ServiceCategory::Optical;
/// assert_eq!(format!("{:?}", category), "Optical");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    /// Outpatient consultations.
    Consultation,
    /// Clinical examinations.
    Examination,
    /// Medical procedures.
    Procedure,
    /// Imaging (OCT, fundus photography, etc.).
    Imaging,
    /// Laboratory work.
    Laboratory,
    /// Dispensed medication.
    Medication,
    /// Surgical interventions.
    Surgery,
    /// Optical goods (frames, lenses).
    Optical,
    /// Anything that does not fit the categories above.
    Other,
}

/// A raw billable line item as supplied by the caller.
///
/// Missing `quantity`, `unit_price`, or `category` are tolerated: one bad
/// line item must never block an entire invoice. The permissive defaults
/// (`quantity = 1`, `unit_price = 0`, category falls through to the default
/// coverage) are recorded on the normalized item so a reviewer can catch
/// data-entry errors in the audit trail.
///
/// # Example
///
/// ```
/// use convention_engine::models::{BillingItem, ServiceCategory};
/// use rust_decimal::Decimal;
///
/// let item = BillingItem {
///     code: "CONSULT".to_string(),
///     description: "Consultation ophtalmologique".to_string(),
///     category: Some(ServiceCategory::Consultation),
///     quantity: Some(Decimal::ONE),
///     unit_price: Some(Decimal::from(30)),
/// };
/// let normalized = item.normalized();
/// assert!(normalized.defaulted_fields.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingItem {
    /// The act code (e.g., "CONSULT", "FOND-ND").
    pub code: String,
    /// Human-readable description of the act.
    #[serde(default)]
    pub description: String,
    /// The service category, if known.
    #[serde(default)]
    pub category: Option<ServiceCategory>,
    /// The quantity billed. Defaults to 1 when absent.
    #[serde(default)]
    pub quantity: Option<Decimal>,
    /// The unit price. Defaults to 0 when absent.
    #[serde(default)]
    pub unit_price: Option<Decimal>,
}

impl BillingItem {
    /// Fills permissive defaults and records which fields were defaulted.
    pub fn normalized(&self) -> NormalizedItem {
        let mut defaulted_fields = Vec::new();

        let quantity = match self.quantity {
            Some(q) => q,
            None => {
                defaulted_fields.push("quantity".to_string());
                Decimal::ONE
            }
        };
        let unit_price = match self.unit_price {
            Some(p) => p,
            None => {
                defaulted_fields.push("unit_price".to_string());
                Decimal::ZERO
            }
        };
        if self.category.is_none() {
            defaulted_fields.push("category".to_string());
        }

        NormalizedItem {
            code: self.code.clone(),
            description: self.description.clone(),
            category: self.category,
            quantity,
            unit_price,
            is_package: false,
            defaulted_fields,
        }
    }
}

/// A line item after default-filling, as consumed by the bundling resolver
/// and the coverage calculator.
///
/// Synthetic package lines produced by bundling carry `is_package = true`
/// and no category, so per-category rules never apply to a flat package
/// price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedItem {
    /// The act code, or the package code for a synthetic bundle line.
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// The service category, if known.
    pub category: Option<ServiceCategory>,
    /// The quantity billed.
    pub quantity: Decimal,
    /// The unit price.
    pub unit_price: Decimal,
    /// Whether this line is a synthetic package bundle.
    pub is_package: bool,
    /// Input fields that were absent and filled with permissive defaults.
    pub defaulted_fields: Vec<String>,
}
