//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts flow through the ledger as full-precision `Decimal` values and are
//! rounded to the storage scale only when assigned to a persisted column.

use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits kept by `NUMERIC(19, 4)` amount columns.
pub const STORAGE_SCALE: u32 = 4;

/// Rounds an amount to the storage scale, half away from zero.
#[must_use]
pub fn to_storage(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(STORAGE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true when `amount` is a valid debit or credit magnitude.
#[must_use]
pub fn is_magnitude(amount: Decimal) -> bool {
    !amount.is_sign_negative() || amount.is_zero()
}
