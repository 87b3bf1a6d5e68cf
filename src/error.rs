//! Error types for the Convention Billing Calculation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during billing calculation and
//! convention configuration resolution.

use thiserror::Error;

/// The main error type for the Convention Billing Calculation Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use convention_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/conventions".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/conventions");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No convention with the given identifier is loaded.
    #[error("Convention not found: {id}")]
    ConventionNotFound {
        /// The convention identifier that was not found.
        id: String,
    },

    /// A sub-company names a parent convention that cannot be found.
    ///
    /// Parent-chain resolution failure is fatal: the engine never falls back
    /// to "no rules" for a sub-company whose parent is missing.
    #[error("Parent convention '{parent}' not found for company '{company}'")]
    ParentNotFound {
        /// The sub-company whose parent is missing.
        company: String,
        /// The missing parent convention identifier.
        parent: String,
    },

    /// A convention document contains an invalid policy value.
    ///
    /// Raised at configuration-load time so an invalid company is blocked
    /// from activation instead of producing negative shares at billing time.
    #[error("Invalid policy for company '{company}', field '{field}': {message}")]
    PolicyValidation {
        /// The company whose configuration is invalid.
        company: String,
        /// The offending field.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
