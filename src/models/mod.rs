//! Data models for the Convention Billing Calculation Engine.

mod billing_item;
mod billing_result;

pub use billing_item::{BillingItem, NormalizedItem, ServiceCategory};
pub use billing_result::{
    AppliedDiscount, AppliedPackage, AuditStep, AuditTrace, AuditWarning, BillingSummary,
    CapApplication, DiscountKind, ItemCalculation,
};
