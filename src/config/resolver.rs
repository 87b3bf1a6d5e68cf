//! Convention resolution and policy validation.
//!
//! Parent → sub-company inheritance is a configuration concern, performed
//! once per company before any calculation: if the sub-company defines a
//! field it wins outright (lists replace wholesale, there is no field-level
//! merging within a list); if absent, the parent's value is used. Inheritance
//! is live, not a one-time copy, because resolution happens against the
//! parent document as it exists at resolution time.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::money::Currency;

use super::types::{ConventionConfig, EffectiveConfig};

/// Validates a convention document's policy values.
///
/// Invalid values are rejected here, at configuration-load time, so they
/// block a company's activation instead of surfacing as negative shares in
/// the middle of a billing calculation.
///
/// # Errors
///
/// Returns [`EngineError::PolicyValidation`] for:
/// - a coverage or discount percentage outside 0–100
/// - a negative `max_per_category`
/// - a non-positive package price
/// - a negative auto-approve threshold
pub fn validate_convention(config: &ConventionConfig) -> EngineResult<()> {
    let policy_error = |field: &str, message: &str| EngineError::PolicyValidation {
        company: config.id.clone(),
        field: field.to_string(),
        message: message.to_string(),
    };
    let percentage_in_range = |value: Decimal| value >= Decimal::ZERO && value <= Decimal::ONE_HUNDRED;

    if let Some(coverage) = &config.default_coverage
        && !percentage_in_range(coverage.percentage)
    {
        return Err(policy_error(
            "default_coverage.percentage",
            "must be between 0 and 100",
        ));
    }

    for rule in config.covered_categories.iter().flatten() {
        if let Some(pct) = rule.coverage_percentage
            && !percentage_in_range(pct)
        {
            return Err(policy_error(
                "covered_categories.coverage_percentage",
                "must be between 0 and 100",
            ));
        }
        if let Some(discount) = rule.additional_discount
            && !percentage_in_range(discount)
        {
            return Err(policy_error(
                "covered_categories.additional_discount",
                "must be between 0 and 100",
            ));
        }
        if let Some(max) = rule.max_per_category
            && max < Decimal::ZERO
        {
            return Err(policy_error(
                "covered_categories.max_per_category",
                "must not be negative",
            ));
        }
    }

    if let Some(rules) = &config.approval_rules {
        if let Some(threshold) = rules.auto_approve_under_amount
            && threshold < Decimal::ZERO
        {
            return Err(policy_error(
                "approval_rules.auto_approve_under_amount",
                "must not be negative",
            ));
        }
        if let Some(discount) = &rules.global_discount
            && !percentage_in_range(discount.percentage)
        {
            return Err(policy_error(
                "approval_rules.global_discount.percentage",
                "must be between 0 and 100",
            ));
        }
    }

    for deal in config.package_deals.iter().flatten() {
        if deal.price <= Decimal::ZERO {
            return Err(policy_error(
                "package_deals.price",
                "must be greater than zero",
            ));
        }
    }

    Ok(())
}

/// Resolves a convention's effective rule set against its optional parent.
///
/// # Arguments
///
/// * `company` - The convention to resolve
/// * `parent` - The parent convention document, required when
///   `company.parent_convention` is set
///
/// # Errors
///
/// Returns [`EngineError::ParentNotFound`] when `parent_convention` is set
/// but the matching parent document is not supplied; the engine never
/// silently falls back to "no rules". Returns
/// [`EngineError::PolicyValidation`] when neither the company nor its parent
/// defines a default coverage.
pub fn resolve_effective(
    company: &ConventionConfig,
    parent: Option<&ConventionConfig>,
) -> EngineResult<EffectiveConfig> {
    if let Some(parent_id) = &company.parent_convention {
        let found = parent.is_some_and(|p| p.id == *parent_id);
        if !found {
            return Err(EngineError::ParentNotFound {
                company: company.id.clone(),
                parent: parent_id.clone(),
            });
        }
    }
    // A parent document is only consulted when the company names it.
    let parent = company.parent_convention.as_ref().and(parent);

    let default_coverage = company
        .default_coverage
        .or_else(|| parent.and_then(|p| p.default_coverage))
        .ok_or_else(|| EngineError::PolicyValidation {
            company: company.id.clone(),
            field: "default_coverage".to_string(),
            message: "neither the company nor its parent defines a default coverage".to_string(),
        })?;

    let covered_categories = company
        .covered_categories
        .clone()
        .or_else(|| parent.and_then(|p| p.covered_categories.clone()))
        .unwrap_or_default();

    let approval_rules = company
        .approval_rules
        .clone()
        .or_else(|| parent.and_then(|p| p.approval_rules.clone()))
        .unwrap_or_default();

    let package_deals = company
        .package_deals
        .clone()
        .or_else(|| parent.and_then(|p| p.package_deals.clone()))
        .unwrap_or_default();

    let acts_requiring_approval = company
        .acts_requiring_approval
        .clone()
        .or_else(|| parent.and_then(|p| p.acts_requiring_approval.clone()))
        .unwrap_or_default();

    let currency = company
        .currency
        .or_else(|| parent.and_then(|p| p.currency))
        .unwrap_or(Currency::Cdf);

    Ok(EffectiveConfig {
        company_id: company.id.clone(),
        company_name: company.name.clone(),
        currency,
        default_coverage_percentage: default_coverage.percentage,
        covered_categories,
        approval_rules,
        package_deals,
        acts_requiring_approval,
    })
}
