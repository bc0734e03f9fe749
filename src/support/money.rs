//! Decimal helpers for currency amounts and usage quantities

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::errors::{DomainError, DomainResult};

/// Decimal places used when presenting currency amounts.
pub const MONEY_DECIMALS: u32 = 2;

/// Round a currency amount to cents, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a usage quantity into a decimal, rejecting negative and
/// non-finite values.
pub fn usage_quantity(field: &'static str, value: f64) -> DomainResult<Decimal> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::invalid_usage(field, value));
    }
    Decimal::from_f64(value).ok_or_else(|| DomainError::invalid_usage(field, value))
}

/// Convert a decimal back to `f64` for usage records.
///
/// Goes through the decimal string so the result is the `f64` nearest to the
/// exact decimal value.
pub fn to_quantity(field: &'static str, value: Decimal) -> DomainResult<f64> {
    value
        .normalize()
        .to_string()
        .parse::<f64>()
        .map_err(|_| DomainError::invalid_usage(field, value))
}

// ── Tests ──────────────────────────────────────────────────────
