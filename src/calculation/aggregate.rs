//! Invoice-level aggregation.
//!
//! Aggregation is pure summation over already-rounded per-item amounts.
//! Totals are never re-rounded: each item's shares are already at the
//! currency's precision, so the sums are exact by construction.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::ItemCalculation;
use crate::money::safe_add;

/// The invoice-level totals and partitions over the resolved items.
#[derive(Debug, Clone)]
pub struct AggregateOutcome {
    /// Sum of all item company shares.
    pub total_company_share: Decimal,
    /// Sum of all item patient shares.
    pub total_patient_share: Decimal,
    /// Items left in the pending-approval state.
    pub approval_required: Vec<ItemCalculation>,
    /// Items whose category is excluded from coverage.
    pub not_covered: Vec<ItemCalculation>,
    /// Items that received a discount of either kind.
    pub discounts_applied: Vec<ItemCalculation>,
}

/// Sums the resolved items and partitions them by outcome.
///
/// The partitions hold copies of the items; the full item list keeps its
/// order (package lines first, then input order) untouched.
pub fn aggregate(items: &[ItemCalculation]) -> EngineResult<AggregateOutcome> {
    let mut total_company_share = Decimal::ZERO;
    let mut total_patient_share = Decimal::ZERO;
    let mut approval_required = Vec::new();
    let mut not_covered = Vec::new();
    let mut discounts_applied = Vec::new();

    for item in items {
        total_company_share = safe_add(total_company_share, item.company_share)?;
        total_patient_share = safe_add(total_patient_share, item.patient_share)?;

        if item.pending_approval {
            approval_required.push(item.clone());
        }
        if item.not_covered {
            not_covered.push(item.clone());
        }
        if item.discount_applied() {
            discounts_applied.push(item.clone());
        }
    }

    Ok(AggregateOutcome {
        total_company_share,
        total_patient_share,
        approval_required,
        not_covered,
        discounts_applied,
    })
}
