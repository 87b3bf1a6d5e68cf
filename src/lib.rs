//! Convention Billing Calculation Engine.
//!
//! This crate decides how each billable clinical item on an invoice splits
//! between the payer (an insurer or employer "convention") and the patient,
//! applying package bundling, per-category coverage percentages, approval
//! gating, discounts, and category spend caps.
//!
//! The engine is pure and in-memory: configuration is resolved once up front,
//! [`calculation::calculate_billing`] is a single synchronous call, and the
//! caller persists the resulting [`models::BillingSummary`].

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod money;
