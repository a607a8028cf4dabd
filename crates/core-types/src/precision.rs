//! Fixed decimal precision used across the ledger.
//!
//! Costs, fees and cash balances are rounded; anything that decides how much
//! can be afforded or sold is truncated toward zero so it never overshoots.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept on every monetary and quantity value.
pub const ROUND_TO: u32 = 4;

/// Rounds half away from zero to `dp` decimal places.
pub fn round_to(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncates toward zero to `dp` decimal places.
pub fn truncate_to(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::ToZero)
}
