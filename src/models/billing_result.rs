//! Calculation result models.
//!
//! This module contains the per-item [`ItemCalculation`] and the
//! invoice-level [`BillingSummary`] produced by the engine, together with
//! the audit-trail structures that mirror every decision for display and
//! dispute resolution.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ServiceCategory;
use crate::money::Currency;

/// Which discount fired for an item.
///
/// Global and category discounts are mutually exclusive: the global discount
/// always wins, the two never stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// The convention-wide discount from the approval rules.
    Global,
    /// The category-scoped additional discount.
    Category,
}

/// A discount applied to one item, retained for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    /// Whether the global or the category discount fired.
    pub kind: DiscountKind,
    /// The discount percentage.
    pub percentage: Decimal,
    /// The rounded discount amount subtracted from the item total.
    pub amount: Decimal,
}

/// Details of a category spend-cap clamp applied to one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapApplication {
    /// The category's cumulative cap.
    pub max_per_category: Decimal,
    /// What the convention had already paid for the category before this item.
    pub already_paid: Decimal,
    /// The amount clamped away from the company share. It becomes the
    /// patient's responsibility, never waived.
    pub withheld: Decimal,
}

/// The calculation outcome for a single line item.
///
/// Echoes the item and retains every intermediate flag: the flags are part
/// of the contract consumed by downstream approval workflows and UI, not
/// implementation detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCalculation {
    /// The act code (or package code for a bundled line).
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// The service category, if known.
    pub category: Option<ServiceCategory>,
    /// The quantity billed.
    pub quantity: Decimal,
    /// The unit price.
    pub unit_price: Decimal,
    /// `quantity * unit_price`, before any discount.
    pub item_total: Decimal,
    /// The item total after discount. Equals `item_total` for not-covered
    /// and pending-approval items.
    pub effective_total: Decimal,
    /// The coverage percentage actually applied.
    pub coverage_percentage: Decimal,
    /// The amount the convention pays.
    pub company_share: Decimal,
    /// The amount the patient pays.
    pub patient_share: Decimal,
    /// Terminal state: the category is excluded from coverage.
    pub not_covered: bool,
    /// Terminal state: the item awaits approval; the convention pays nothing
    /// until the approval is granted.
    pub pending_approval: bool,
    /// The item was approval-gated but fell under the auto-approve threshold.
    pub auto_approved: bool,
    /// The discount that fired, if any.
    pub discount: Option<AppliedDiscount>,
    /// The cap clamp applied, if any.
    pub cap: Option<CapApplication>,
    /// Whether this line is a synthetic package bundle.
    pub is_package: bool,
    /// Input fields that were defaulted during normalization.
    pub defaulted_fields: Vec<String>,
}

impl ItemCalculation {
    /// Whether any discount fired for this item.
    pub fn discount_applied(&self) -> bool {
        self.discount.is_some()
    }

    /// Whether the category cap clamped this item's company share.
    pub fn max_applied(&self) -> bool {
        self.cap.is_some()
    }
}

/// A package deal that was applied during bundling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPackage {
    /// The package code.
    pub code: String,
    /// The package name.
    pub name: String,
    /// The flat package price.
    pub price: Decimal,
    /// The sum of the matched items' individual totals.
    pub original_total: Decimal,
    /// `original_total - price`.
    pub savings: Decimal,
    /// The codes of the items the package consumed.
    pub bundled_codes: Vec<String>,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention, such as defaulted input fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a billing calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The complete result of a billing calculation.
///
/// The caller persists this summary onto a durable invoice document; the
/// engine itself never persists anything.
///
/// # Example
///
/// ```
/// use convention_engine::models::{AuditTrace, BillingSummary};
/// use convention_engine::money::Currency;
/// use chrono::Utc;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let summary = BillingSummary {
///     calculation_id: Uuid::new_v4(),
///     timestamp: Utc::now(),
///     engine_version: "0.1.0".to_string(),
///     company_id: "activa".to_string(),
///     currency: Currency::Cdf,
///     items: vec![],
///     total_company_share: Decimal::ZERO,
///     total_patient_share: Decimal::ZERO,
///     approval_required: vec![],
///     not_covered: vec![],
///     discounts_applied: vec![],
///     packages_applied: vec![],
///     total_savings: Decimal::ZERO,
///     audit_trace: AuditTrace { steps: vec![], warnings: vec![], duration_us: 0 },
/// };
/// assert_eq!(summary.items.len(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSummary {
    /// Unique identifier of this calculation run.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The engine version that produced this summary.
    pub engine_version: String,
    /// The convention the invoice was calculated against.
    pub company_id: String,
    /// The currency every amount in this summary is denominated in.
    pub currency: Currency,
    /// Per-item calculation results, in input order (packages first).
    pub items: Vec<ItemCalculation>,
    /// Sum of all item company shares. Pure summation, never re-rounded.
    pub total_company_share: Decimal,
    /// Sum of all item patient shares. Pure summation, never re-rounded.
    pub total_patient_share: Decimal,
    /// Items left in the pending-approval state.
    pub approval_required: Vec<ItemCalculation>,
    /// Items whose category is excluded from coverage.
    pub not_covered: Vec<ItemCalculation>,
    /// Items that received a discount of either kind.
    pub discounts_applied: Vec<ItemCalculation>,
    /// Package deals applied during bundling.
    pub packages_applied: Vec<AppliedPackage>,
    /// Total savings across all applied packages.
    pub total_savings: Decimal,
    /// Every decision taken during the calculation.
    pub audit_trace: AuditTrace,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_item() -> ItemCalculation {
        ItemCalculation {
            code: "CONSULT".to_string(),
            description: "Consultation".to_string(),
            category: Some(ServiceCategory::Consultation),
            quantity: Decimal::ONE,
            unit_price: dec("30"),
            item_total: dec("30"),
            effective_total: dec("30"),
            coverage_percentage: dec("100"),
            company_share: dec("30"),
            patient_share: Decimal::ZERO,
            not_covered: false,
            pending_approval: false,
            auto_approved: false,
            discount: None,
            cap: None,
            is_package: false,
            defaulted_fields: vec![],
        }
    }

    #[test]
    fn test_discount_applied_reflects_discount_presence() {
        let mut item = sample_item();
        assert!(!item.discount_applied());

        item.discount = Some(AppliedDiscount {
            kind: DiscountKind::Global,
            percentage: dec("10"),
            amount: dec("3"),
        });
        assert!(item.discount_applied());
    }

    #[test]
    fn test_max_applied_reflects_cap_presence() {
        let mut item = sample_item();
        assert!(!item.max_applied());

        item.cap = Some(CapApplication {
            max_per_category: dec("60"),
            already_paid: dec("60"),
            withheld: dec("30"),
        });
        assert!(item.max_applied());
    }

    #[test]
    fn test_item_calculation_serializes_flags() {
        let item = sample_item();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["not_covered"], false);
        assert_eq!(json["pending_approval"], false);
        assert_eq!(json["auto_approved"], false);
        assert!(json["discount"].is_null());
        assert!(json["cap"].is_null());
    }

    #[test]
    fn test_discount_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DiscountKind::Global).unwrap(),
            r#""global""#
        );
        assert_eq!(
            serde_json::to_string(&DiscountKind::Category).unwrap(),
            r#""category""#
        );
    }
}
