//! Safe-arithmetic and currency utilities.
//!
//! Every monetary computation in the engine routes through this module
//! instead of native floating point, so that rounding behavior is identical
//! on every platform and matches already-issued invoices bit-for-bit.
//!
//! Rounding is half-up ([`RoundingStrategy::MidpointAwayFromZero`]) to the
//! currency's decimal precision: CDF amounts are whole francs, USD and EUR
//! amounts carry two decimals.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The currencies conventions are denominated in.
///
/// # Example
///
/// ```
/// use convention_engine::money::Currency;
///
/// assert_eq!(Currency::Cdf.decimal_places(), 0);
/// assert_eq!(Currency::Usd.decimal_places(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Congolese franc. No decimal subdivision in practice.
    #[default]
    Cdf,
    /// United States dollar.
    Usd,
    /// Euro.
    Eur,
}

impl Currency {
    /// Returns the number of decimal places amounts in this currency carry.
    pub fn decimal_places(self) -> u32 {
        match self {
            Currency::Cdf => 0,
            Currency::Usd | Currency::Eur => 2,
        }
    }
}

/// Rounds a value to the given number of decimal places, half-up.
///
/// # Example
///
/// ```
/// use convention_engine::money::round_to_decimals;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let value = Decimal::from_str("49.5").unwrap();
/// assert_eq!(round_to_decimals(value, 0), Decimal::from(50));
/// ```
pub fn round_to_decimals(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a value to the currency's decimal precision, half-up.
pub fn round_amount(value: Decimal, currency: Currency) -> Decimal {
    round_to_decimals(value, currency.decimal_places())
}

/// Adds two decimals, surfacing overflow as a calculation error.
pub fn safe_add(a: Decimal, b: Decimal) -> EngineResult<Decimal> {
    a.checked_add(b).ok_or_else(|| EngineError::CalculationError {
        message: format!("decimal overflow adding {a} and {b}"),
    })
}

/// Subtracts `b` from `a`, surfacing overflow as a calculation error.
pub fn safe_subtract(a: Decimal, b: Decimal) -> EngineResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| EngineError::CalculationError {
        message: format!("decimal overflow subtracting {b} from {a}"),
    })
}

/// Multiplies two decimals, surfacing overflow as a calculation error.
pub fn safe_multiply(a: Decimal, b: Decimal) -> EngineResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| EngineError::CalculationError {
        message: format!("decimal overflow multiplying {a} by {b}"),
    })
}

/// Divides `a` by `b`, surfacing division by zero as a calculation error.
pub fn safe_divide(a: Decimal, b: Decimal) -> EngineResult<Decimal> {
    a.checked_div(b).ok_or_else(|| EngineError::CalculationError {
        message: format!("division by zero or overflow dividing {a} by {b}"),
    })
}

/// Computes `pct` percent of `amount`, rounded to the currency's precision.
///
/// This is one independent rounding step. The coverage calculator applies it
/// twice (once for the discount, once for the company share); the two stages
/// must never be algebraically combined.
///
/// # Example
///
/// ```
/// use convention_engine::money::{percentage_of, Currency};
/// use rust_decimal::Decimal;
///
/// // 80% of 33 CDF rounds to 26, not 26.4
/// let share = percentage_of(Decimal::from(33), Decimal::from(80), Currency::Cdf).unwrap();
/// assert_eq!(share, Decimal::from(26));
/// ```
pub fn percentage_of(amount: Decimal, pct: Decimal, currency: Currency) -> EngineResult<Decimal> {
    let scaled = safe_divide(safe_multiply(amount, pct)?, Decimal::ONE_HUNDRED)?;
    Ok(round_amount(scaled, currency))
}
