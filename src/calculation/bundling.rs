//! Package bundling resolution.
//!
//! A package deal replaces a set of individually billed acts with one flat
//! price, but only when every included act is present on the invoice. This
//! module matches each active deal against the remaining item list, in
//! configured order, and replaces fully matched sets with a synthetic
//! bundle line inserted at the front of the list.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::PackageDeal;
use crate::error::EngineResult;
use crate::models::{AppliedPackage, AuditStep, NormalizedItem};
use crate::money::{safe_add, safe_multiply, safe_subtract};

/// The outcome of matching one package deal against an item list.
///
/// Partial matches are represented explicitly rather than collapsed into a
/// boolean: a package that overlaps the invoice without covering it leaves
/// every item billed individually, and the missing codes are part of the
/// audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageMatch {
    /// Every included act was found among the remaining items.
    Matched {
        /// Indices of the matched items, in scan order.
        matched_indices: Vec<usize>,
        /// Sum of `quantity * unit_price` over the matched items.
        original_total: Decimal,
        /// `original_total - package price`.
        savings: Decimal,
    },
    /// Some but not all included acts were found. No bundling occurs.
    PartiallyMatched {
        /// The package codes that found no matching item.
        missing_codes: Vec<String>,
    },
    /// None of the included acts were found, or the deal has no act codes.
    NoMatch,
}

/// Whether two uppercased act codes refer to the same act.
///
/// Codes match exactly, or when one is a dash/underscore-delimited prefix
/// of the other (so "FOND" matches "FOND-ND" but not "FONDATION").
fn act_code_matches(a: &str, b: &str) -> bool {
    fn delimited_prefix(longer: &str, shorter: &str) -> bool {
        longer.len() > shorter.len()
            && longer.starts_with(shorter)
            && matches!(longer.as_bytes()[shorter.len()], b'-' | b'_')
    }
    a == b || delimited_prefix(a, b) || delimited_prefix(b, a)
}

/// Matches one package deal against the current item list.
///
/// Each item consumes at most one package code, and synthetic bundle lines
/// from earlier deals are never rematched. A match succeeds only when every
/// package code is consumed; partial overlap never bundles.
pub fn match_package(items: &[NormalizedItem], deal: &PackageDeal) -> EngineResult<PackageMatch> {
    let mut unmatched: Vec<String> = deal
        .included_acts
        .iter()
        .map(|code| code.to_uppercase())
        .collect();
    if unmatched.is_empty() {
        return Ok(PackageMatch::NoMatch);
    }

    let mut matched_indices = Vec::new();
    for (index, item) in items.iter().enumerate() {
        if item.is_package {
            continue;
        }
        let item_code = item.code.to_uppercase();
        if let Some(position) = unmatched
            .iter()
            .position(|code| act_code_matches(code, &item_code))
        {
            unmatched.remove(position);
            matched_indices.push(index);
        }
    }

    if !unmatched.is_empty() {
        if matched_indices.is_empty() {
            return Ok(PackageMatch::NoMatch);
        }
        return Ok(PackageMatch::PartiallyMatched {
            missing_codes: unmatched,
        });
    }

    let mut original_total = Decimal::ZERO;
    for &index in &matched_indices {
        let item = &items[index];
        let line_total = safe_multiply(item.quantity, item.unit_price)?;
        original_total = safe_add(original_total, line_total)?;
    }
    let savings = safe_subtract(original_total, deal.price)?;

    Ok(PackageMatch::Matched {
        matched_indices,
        original_total,
        savings,
    })
}

/// The result of applying every active package deal to an item list.
#[derive(Debug, Clone)]
pub struct BundleOutcome {
    /// The item list after bundling; synthetic package lines come first.
    pub items: Vec<NormalizedItem>,
    /// The deals that applied, in application order.
    pub packages_applied: Vec<AppliedPackage>,
    /// Total savings across applied deals.
    pub total_savings: Decimal,
    /// One audit step per applied deal and per partial match.
    pub audit_steps: Vec<AuditStep>,
}

/// Applies package deals sequentially against the shrinking item list.
///
/// Deals are tried in configured order; items consumed by an earlier deal
/// are removed before the next deal is matched, so a later deal never
/// rematches them. Each successful match prepends one synthetic item
/// (`is_package = true`, quantity 1, unit price = package price), giving
/// package lines first claim on any downstream category cap.
///
/// # Arguments
///
/// * `items` - The normalized invoice items, in input order
/// * `deals` - The convention's package deals, in configured order
/// * `first_step_number` - Audit-step numbering starts here
pub fn bundle_packages(
    items: Vec<NormalizedItem>,
    deals: &[PackageDeal],
    first_step_number: u32,
) -> EngineResult<BundleOutcome> {
    let mut working = items;
    let mut packages_applied = Vec::new();
    let mut audit_steps = Vec::new();
    let mut total_savings = Decimal::ZERO;
    let mut step_number = first_step_number;

    for deal in deals.iter().filter(|deal| deal.active) {
        match match_package(&working, deal)? {
            PackageMatch::Matched {
                matched_indices,
                original_total,
                savings,
            } => {
                let bundled_codes: Vec<String> = matched_indices
                    .iter()
                    .map(|&index| working[index].code.clone())
                    .collect();

                // Remove from the back so earlier indices stay valid.
                for &index in matched_indices.iter().rev() {
                    working.remove(index);
                }
                working.insert(
                    0,
                    NormalizedItem {
                        code: deal.code.clone(),
                        description: deal.name.clone(),
                        category: None,
                        quantity: Decimal::ONE,
                        unit_price: deal.price,
                        is_package: true,
                        defaulted_fields: vec![],
                    },
                );

                total_savings = safe_add(total_savings, savings)?;
                debug!(
                    package = %deal.code,
                    %original_total,
                    %savings,
                    "applied package deal"
                );

                audit_steps.push(AuditStep {
                    step_number,
                    rule_id: "package_bundling".to_string(),
                    rule_name: "Package Bundling".to_string(),
                    input: serde_json::json!({
                        "package_code": deal.code,
                        "package_price": deal.price.to_string(),
                        "included_acts": deal.included_acts,
                    }),
                    output: serde_json::json!({
                        "matched": true,
                        "bundled_codes": bundled_codes,
                        "original_total": original_total.to_string(),
                        "savings": savings.to_string(),
                    }),
                    reasoning: format!(
                        "Bundled {} items into package '{}': {} replaced by flat price {} (savings {})",
                        bundled_codes.len(),
                        deal.name,
                        original_total,
                        deal.price,
                        savings
                    ),
                });
                step_number += 1;

                packages_applied.push(AppliedPackage {
                    code: deal.code.clone(),
                    name: deal.name.clone(),
                    price: deal.price,
                    original_total,
                    savings,
                    bundled_codes,
                });
            }
            PackageMatch::PartiallyMatched { missing_codes } => {
                audit_steps.push(AuditStep {
                    step_number,
                    rule_id: "package_bundling".to_string(),
                    rule_name: "Package Bundling".to_string(),
                    input: serde_json::json!({
                        "package_code": deal.code,
                        "included_acts": deal.included_acts,
                    }),
                    output: serde_json::json!({
                        "matched": false,
                        "missing_codes": missing_codes,
                    }),
                    reasoning: format!(
                        "Package '{}' not applied: missing acts {}",
                        deal.name,
                        missing_codes.join(", ")
                    ),
                });
                step_number += 1;
            }
            PackageMatch::NoMatch => {}
        }
    }

    Ok(BundleOutcome {
        items: working,
        packages_applied,
        total_savings,
        audit_steps,
    })
}
