//! The billing calculation entry point.
//!
//! [`calculate_billing`] is a pure function of its inputs: it never reads
//! configuration mid-flight, never persists anything, and starts every
//! invocation with fresh per-category spending state. The caller resolves
//! the convention once (see [`crate::config::ConventionStore::resolve`]) and
//! passes the effective configuration in.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use super::aggregate::aggregate;
use super::bundling::bundle_packages;
use super::coverage::calculate_item_coverage;
use crate::config::EffectiveConfig;
use crate::error::EngineResult;
use crate::models::{AuditTrace, AuditWarning, BillingItem, BillingSummary, ServiceCategory};

/// Per-invocation options for a billing calculation.
#[derive(Debug, Clone, Default)]
pub struct BillingOptions {
    /// Patient-specific coverage percentage. Applies only where no category
    /// rule carries its own percentage; it replaces the convention default.
    pub patient_coverage_override: Option<Decimal>,
    /// Simulation flag: treat every approval-gated item as already approved.
    /// Used to preview what the convention would pay once approvals clear.
    pub assume_approved: bool,
}

/// Calculates the billing split for one invoice against a resolved
/// convention.
///
/// The pipeline runs in fixed order: normalize, bundle packages, resolve
/// coverage per item, aggregate. Item order is preserved, with synthetic
/// package lines prepended. Every invocation is independent: category
/// spending starts at zero and nothing carries over between calls.
///
/// # Arguments
///
/// * `items` - The invoice's raw line items, in input order
/// * `config` - The resolved convention configuration
/// * `options` - Per-invocation options
///
/// # Returns
///
/// The complete [`BillingSummary`], including the audit trace.
///
/// # Example
///
/// ```
/// use convention_engine::calculation::{calculate_billing, BillingOptions};
/// use convention_engine::config::{ApprovalRules, EffectiveConfig};
/// use convention_engine::models::{BillingItem, ServiceCategory};
/// use convention_engine::money::Currency;
/// use rust_decimal::Decimal;
///
/// let config = EffectiveConfig {
///     company_id: "bralima".to_string(),
///     company_name: "BRALIMA".to_string(),
///     currency: Currency::Cdf,
///     default_coverage_percentage: Decimal::from(100),
///     covered_categories: vec![],
///     approval_rules: ApprovalRules::default(),
///     package_deals: vec![],
///     acts_requiring_approval: vec![],
/// };
/// let items = vec![BillingItem {
///     code: "CONSULT".to_string(),
///     description: "Consultation".to_string(),
///     category: Some(ServiceCategory::Consultation),
///     quantity: Some(Decimal::ONE),
///     unit_price: Some(Decimal::from(30000)),
/// }];
///
/// let summary = calculate_billing(&items, &config, &BillingOptions::default()).unwrap();
/// assert_eq!(summary.total_company_share, Decimal::from(30000));
/// assert_eq!(summary.total_patient_share, Decimal::ZERO);
/// ```
pub fn calculate_billing(
    items: &[BillingItem],
    config: &EffectiveConfig,
    options: &BillingOptions,
) -> EngineResult<BillingSummary> {
    let started = Instant::now();
    let mut warnings = Vec::new();

    let normalized: Vec<_> = items.iter().map(BillingItem::normalized).collect();
    for item in &normalized {
        if !item.defaulted_fields.is_empty() {
            warnings.push(AuditWarning {
                code: "DEFAULTED_FIELD".to_string(),
                message: format!(
                    "Item '{}' was missing {}; permissive defaults applied",
                    item.code,
                    item.defaulted_fields.join(", ")
                ),
                severity: "medium".to_string(),
            });
        }
    }

    let bundle = bundle_packages(normalized, &config.package_deals, 1)?;
    let mut steps = bundle.audit_steps;
    let mut next_step = steps.len() as u32 + 1;

    let mut spending: HashMap<ServiceCategory, Decimal> = HashMap::new();
    let mut item_calculations = Vec::with_capacity(bundle.items.len());
    for item in &bundle.items {
        let result = calculate_item_coverage(item, config, &mut spending, options, next_step)?;
        steps.push(result.audit_step);
        item_calculations.push(result.calculation);
        next_step += 1;
    }

    let totals = aggregate(&item_calculations)?;

    let summary = BillingSummary {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        company_id: config.company_id.clone(),
        currency: config.currency,
        items: item_calculations,
        total_company_share: totals.total_company_share,
        total_patient_share: totals.total_patient_share,
        approval_required: totals.approval_required,
        not_covered: totals.not_covered,
        discounts_applied: totals.discounts_applied,
        packages_applied: bundle.packages_applied,
        total_savings: bundle.total_savings,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us: started.elapsed().as_micros() as u64,
        },
    };

    debug!(
        company = %summary.company_id,
        items = summary.items.len(),
        company_share = %summary.total_company_share,
        patient_share = %summary.total_patient_share,
        duration_us = summary.audit_trace.duration_us,
        "billing calculated"
    );

    Ok(summary)
}
