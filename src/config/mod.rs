//! Convention configuration for the billing engine.
//!
//! A convention (insurer or employer agreement) is described by a YAML
//! document. Sub-company conventions inherit unset fields from their parent
//! insurer at resolution time; the [`resolver`] module performs that
//! inheritance and validates policy values, and the [`ConventionStore`]
//! loads a directory of convention documents.

mod loader;
mod resolver;
mod types;

pub use loader::ConventionStore;
pub use resolver::{resolve_effective, validate_convention};
pub use types::{
    ApprovalRules, ConventionConfig, CoveredCategoryRule, DefaultCoverage, EffectiveConfig,
    GlobalDiscount, PackageDeal,
};
