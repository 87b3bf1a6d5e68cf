//! Configuration types for convention billing.
//!
//! This module contains the strongly-typed structures deserialized from
//! convention YAML documents, plus the [`EffectiveConfig`] produced by
//! parent → sub-company resolution.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::ServiceCategory;
use crate::money::Currency;

/// The default coverage applied when no category rule matches.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DefaultCoverage {
    /// The percentage of each charge the convention pays by default.
    pub percentage: Decimal,
}

/// A per-category coverage rule within a convention.
#[derive(Debug, Clone, Deserialize)]
pub struct CoveredCategoryRule {
    /// The service category this rule governs.
    pub category: ServiceCategory,
    /// Coverage percentage for this category. Falls back to the default
    /// coverage when absent.
    #[serde(default)]
    pub coverage_percentage: Option<Decimal>,
    /// Whether items in this category require prior approval.
    #[serde(default)]
    pub requires_approval: bool,
    /// Terminal override: the category is excluded from coverage entirely.
    #[serde(default)]
    pub not_covered: bool,
    /// Category-scoped discount percentage. Never stacks with the global
    /// discount.
    #[serde(default)]
    pub additional_discount: Option<Decimal>,
    /// Cumulative cap on what the convention pays for this category within
    /// one invoice.
    #[serde(default)]
    pub max_per_category: Option<Decimal>,
}

/// A convention-wide discount with category exclusions.
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalDiscount {
    /// The discount percentage.
    pub percentage: Decimal,
    /// Categories the global discount does not apply to.
    #[serde(default)]
    pub exclude_categories: Vec<ServiceCategory>,
}

/// Approval-workflow rules for a convention.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApprovalRules {
    /// Items strictly below this amount bypass the approval workflow.
    /// The bound is exclusive: an item priced exactly at the threshold is
    /// not auto-approved.
    #[serde(default)]
    pub auto_approve_under_amount: Option<Decimal>,
    /// Convention-wide discount, if negotiated.
    #[serde(default)]
    pub global_discount: Option<GlobalDiscount>,
}

/// A bundled flat price replacing itemized billing.
///
/// A package only applies when every included act code is present among the
/// remaining unmatched items of an invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageDeal {
    /// The package code, used as the synthetic bundle line's act code.
    pub code: String,
    /// The package name, used as the synthetic bundle line's description.
    pub name: String,
    /// The flat package price.
    pub price: Decimal,
    /// The act codes the package bundles.
    pub included_acts: Vec<String>,
    /// Inactive packages are never matched.
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// A convention document as loaded from YAML.
///
/// Every rule field is optional on a sub-company: an absent field is
/// inherited wholesale from the parent insurer at resolution time, never
/// copied at creation time.
#[derive(Debug, Clone, Deserialize)]
pub struct ConventionConfig {
    /// Unique identifier of the convention.
    pub id: String,
    /// The insurer or employer name.
    pub name: String,
    /// Whether this convention can act as a parent for sub-companies.
    #[serde(default)]
    pub is_parent_convention: bool,
    /// The parent convention's id, for sub-company (employer) plans.
    #[serde(default)]
    pub parent_convention: Option<String>,
    /// The currency the convention is denominated in.
    #[serde(default)]
    pub currency: Option<Currency>,
    /// The default coverage when no category rule matches.
    #[serde(default)]
    pub default_coverage: Option<DefaultCoverage>,
    /// Per-category coverage rules. Lists replace wholesale on override.
    #[serde(default)]
    pub covered_categories: Option<Vec<CoveredCategoryRule>>,
    /// Approval-workflow rules.
    #[serde(default)]
    pub approval_rules: Option<ApprovalRules>,
    /// Package deals offered under this convention.
    #[serde(default)]
    pub package_deals: Option<Vec<PackageDeal>>,
    /// Act codes that always require approval, matched case-insensitively.
    #[serde(default)]
    pub acts_requiring_approval: Option<Vec<String>>,
}

/// A convention's effective rule set after parent → sub-company resolution.
///
/// This is the configuration the calculation engine reads; it is resolved
/// once, before calculation begins, and never re-read mid-calculation.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    /// The resolved convention's id.
    pub company_id: String,
    /// The resolved convention's name.
    pub company_name: String,
    /// The currency all amounts are rounded in.
    pub currency: Currency,
    /// The coverage percentage applied when no category rule matches.
    pub default_coverage_percentage: Decimal,
    /// Per-category coverage rules.
    pub covered_categories: Vec<CoveredCategoryRule>,
    /// Approval-workflow rules.
    pub approval_rules: ApprovalRules,
    /// Active and inactive package deals, in configured order.
    pub package_deals: Vec<PackageDeal>,
    /// Act codes that always require approval.
    pub acts_requiring_approval: Vec<String>,
}

impl EffectiveConfig {
    /// Looks up the rule for a category, if the convention defines one.
    ///
    /// Absence is legal and falls back to the default coverage percentage
    /// with no approval requirement.
    pub fn category_rule(&self, category: ServiceCategory) -> Option<&CoveredCategoryRule> {
        self.covered_categories
            .iter()
            .find(|rule| rule.category == category)
    }

    /// Whether an act code is on the always-requires-approval list.
    ///
    /// Matching is case-insensitive and exact.
    pub fn act_requires_approval(&self, code: &str) -> bool {
        self.acts_requiring_approval
            .iter()
            .any(|act| act.eq_ignore_ascii_case(code))
    }
}
