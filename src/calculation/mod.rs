//! Calculation logic for the Convention Billing Calculation Engine.
//!
//! This module contains the package bundling resolver, the per-item
//! coverage calculator, the invoice-level aggregator, and the single pure
//! entry point [`calculate_billing`] that composes them. The same entry
//! point serves the live request path and audit tooling, so simulated and
//! real billing can never drift apart.

mod aggregate;
mod bundling;
mod coverage;
mod engine;

pub use aggregate::{AggregateOutcome, aggregate};
pub use bundling::{BundleOutcome, PackageMatch, bundle_packages, match_package};
pub use coverage::{ItemCoverageResult, calculate_item_coverage};
pub use engine::{BillingOptions, calculate_billing};
