//! Fixed-point money helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every stored amount has exactly two fractional digits, rounded half away
//! from zero at the point of computation.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits carried by every ledger amount.
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount half-up to two decimals.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Returns true if the amount needs no rounding to be stored.
#[must_use]
pub fn has_money_precision(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}

/// Formats an amount with exactly two decimals (`1050.00`).
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    round_money(amount).to_string()
}

/// Formats an amount the way statements show it: negatives in parentheses.
#[must_use]
pub fn format_accounting(amount: Decimal) -> String {
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("({})", format_money(amount.abs()))
    } else {
        format_money(amount)
    }
}
