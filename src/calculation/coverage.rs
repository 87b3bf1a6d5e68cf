//! Per-item coverage calculation.
//!
//! One call of [`calculate_item_coverage`] resolves a single line item to
//! its company/patient split. The state machine has two terminal branches
//! (not-covered and pending-approval) that short-circuit before any
//! discount or cap logic, then two independent rounding stages: discount
//! first, company share second. The stages are never combined into one
//! multiplication; doing so would change already-issued invoice amounts.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::engine::BillingOptions;
use crate::config::EffectiveConfig;
use crate::error::EngineResult;
use crate::models::{
    AppliedDiscount, AuditStep, CapApplication, DiscountKind, ItemCalculation, NormalizedItem,
    ServiceCategory,
};
use crate::money::{percentage_of, round_amount, safe_add, safe_multiply, safe_subtract};

/// The outcome of calculating coverage for one item.
#[derive(Debug, Clone)]
pub struct ItemCoverageResult {
    /// The fully resolved line item.
    pub calculation: ItemCalculation,
    /// The audit step recording this item's resolution.
    pub audit_step: AuditStep,
}

/// Resolves one line item against the effective convention configuration.
///
/// `spending` tracks the cumulative company spend per capped category for
/// the current invoice; the caller starts from an empty map on every
/// invocation and this function updates it after any cap clamp. Items whose
/// category carries no cap never touch the map.
///
/// # Arguments
///
/// * `item` - The normalized line item (possibly a synthetic package line)
/// * `config` - The resolved convention rules
/// * `spending` - Per-category company spend accumulated so far on this invoice
/// * `options` - Invocation options such as the assume-approved simulation flag
/// * `step_number` - The audit-step number assigned to this item
pub fn calculate_item_coverage(
    item: &NormalizedItem,
    config: &EffectiveConfig,
    spending: &mut HashMap<ServiceCategory, Decimal>,
    options: &BillingOptions,
    step_number: u32,
) -> EngineResult<ItemCoverageResult> {
    let currency = config.currency;
    let item_total = round_amount(safe_multiply(item.quantity, item.unit_price)?, currency);
    let rule = item.category.and_then(|cat| config.category_rule(cat));

    let base = ItemCalculation {
        code: item.code.clone(),
        description: item.description.clone(),
        category: item.category,
        quantity: item.quantity,
        unit_price: item.unit_price,
        item_total,
        effective_total: item_total,
        coverage_percentage: Decimal::ZERO,
        company_share: Decimal::ZERO,
        patient_share: item_total,
        not_covered: false,
        pending_approval: false,
        auto_approved: false,
        discount: None,
        cap: None,
        is_package: item.is_package,
        defaulted_fields: item.defaulted_fields.clone(),
    };

    // Terminal branch: the category is excluded from coverage. No discount,
    // no cap, the patient pays the full item total.
    if rule.is_some_and(|rule| rule.not_covered) {
        let calculation = ItemCalculation {
            not_covered: true,
            ..base
        };
        let audit_step = coverage_step(step_number, &calculation, "category excluded from coverage");
        return Ok(ItemCoverageResult {
            calculation,
            audit_step,
        });
    }

    // Approval gate. An item needs approval when its category rule says so
    // or its act code is on the always-requires-approval list. The
    // auto-approve bound is exclusive: an item priced exactly at the
    // threshold still goes to the approval queue.
    let needs_approval =
        rule.is_some_and(|rule| rule.requires_approval) || config.act_requires_approval(&item.code);
    let mut auto_approved = false;
    if needs_approval {
        let under_threshold = config
            .approval_rules
            .auto_approve_under_amount
            .is_some_and(|threshold| item_total < threshold);
        if under_threshold {
            auto_approved = true;
        } else if !options.assume_approved {
            let calculation = ItemCalculation {
                pending_approval: true,
                ..base
            };
            let audit_step = coverage_step(
                step_number,
                &calculation,
                "approval required; coverage withheld until granted",
            );
            return Ok(ItemCoverageResult {
                calculation,
                audit_step,
            });
        }
    }

    // Discount stage. The global discount always wins over a category
    // discount; the two never stack.
    let global = config
        .approval_rules
        .global_discount
        .as_ref()
        .filter(|discount| {
            discount.percentage > Decimal::ZERO
                && !item
                    .category
                    .is_some_and(|cat| discount.exclude_categories.contains(&cat))
        });
    let discount = if let Some(global) = global {
        Some((DiscountKind::Global, global.percentage))
    } else {
        rule.and_then(|rule| rule.additional_discount)
            .filter(|pct| *pct > Decimal::ZERO)
            .map(|pct| (DiscountKind::Category, pct))
    };

    let (effective_total, applied_discount) = match discount {
        Some((kind, percentage)) => {
            let amount = percentage_of(item_total, percentage, currency)?;
            let effective = safe_subtract(item_total, amount)?;
            (
                effective,
                Some(AppliedDiscount {
                    kind,
                    percentage,
                    amount,
                }),
            )
        }
        None => (item_total, None),
    };

    // Coverage stage, the second rounding point.
    let coverage_percentage = rule
        .and_then(|rule| rule.coverage_percentage)
        .or(options.patient_coverage_override)
        .unwrap_or(config.default_coverage_percentage);
    let mut company_share = percentage_of(effective_total, coverage_percentage, currency)?;

    // Category cap. The clamped portion shifts to the patient, never
    // disappears; spending is recorded after the clamp.
    let mut cap = None;
    if let Some(category) = item.category
        && let Some(max) = rule.and_then(|rule| rule.max_per_category)
    {
        let already_paid = spending.get(&category).copied().unwrap_or(Decimal::ZERO);
        let remaining = safe_subtract(max, already_paid)?.max(Decimal::ZERO);
        if company_share > remaining {
            cap = Some(CapApplication {
                max_per_category: max,
                already_paid,
                withheld: safe_subtract(company_share, remaining)?,
            });
            company_share = remaining;
        }
        let spent = spending.entry(category).or_insert(Decimal::ZERO);
        *spent = safe_add(*spent, company_share)?;
    }

    let patient_share = safe_subtract(effective_total, company_share)?;

    let calculation = ItemCalculation {
        effective_total,
        coverage_percentage,
        company_share,
        patient_share,
        auto_approved,
        discount: applied_discount,
        cap,
        ..base
    };
    let reasoning = match (&calculation.discount, &calculation.cap) {
        (Some(discount), Some(_)) => format!(
            "{}% coverage after {}% discount, capped by category maximum",
            coverage_percentage, discount.percentage
        ),
        (Some(discount), None) => format!(
            "{}% coverage after {}% discount",
            coverage_percentage, discount.percentage
        ),
        (None, Some(_)) => format!(
            "{}% coverage, capped by category maximum",
            coverage_percentage
        ),
        (None, None) => format!("{}% coverage applied", coverage_percentage),
    };
    let audit_step = coverage_step(step_number, &calculation, &reasoning);

    Ok(ItemCoverageResult {
        calculation,
        audit_step,
    })
}

fn coverage_step(step_number: u32, calc: &ItemCalculation, reasoning: &str) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "coverage_calculation".to_string(),
        rule_name: "Coverage Calculation".to_string(),
        input: serde_json::json!({
            "code": calc.code,
            "category": calc.category,
            "item_total": calc.item_total.to_string(),
        }),
        output: serde_json::json!({
            "effective_total": calc.effective_total.to_string(),
            "coverage_percentage": calc.coverage_percentage.to_string(),
            "company_share": calc.company_share.to_string(),
            "patient_share": calc.patient_share.to_string(),
            "not_covered": calc.not_covered,
            "pending_approval": calc.pending_approval,
            "auto_approved": calc.auto_approved,
        }),
        reasoning: reasoning.to_string(),
    }
}
