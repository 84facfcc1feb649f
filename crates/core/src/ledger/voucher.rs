//! Voucher balance validation.

use coopledger_shared::types::to_storage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::LedgerEntryDraft;
use crate::error::LedgerError;

/// Anything carrying a debit and a credit magnitude.
pub trait VoucherLine {
    /// Debit magnitude.
    fn debit(&self) -> Decimal;
    /// Credit magnitude.
    fn credit(&self) -> Decimal;
}

/// A bare debit/credit pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherAmounts {
    /// Debit magnitude.
    pub debit: Decimal,
    /// Credit magnitude.
    pub credit: Decimal,
}

impl VoucherLine for VoucherAmounts {
    fn debit(&self) -> Decimal {
        self.debit
    }

    fn credit(&self) -> Decimal {
        self.credit
    }
}

impl VoucherLine for LedgerEntryDraft {
    fn debit(&self) -> Decimal {
        self.debit
    }

    fn credit(&self) -> Decimal {
        self.credit
    }
}

/// Debit and credit totals of a balanced voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherTotals {
    /// Sum of debits.
    pub debit: Decimal,
    /// Sum of credits.
    pub credit: Decimal,
}

/// Checks that a voucher's debits equal its credits.
///
/// Each line is rounded to the storage scale before summing, so the check
/// holds for the amounts actually written. An empty voucher is balanced
/// with zero totals.
///
/// # Errors
///
/// Returns `LedgerError::Unbalanced` carrying both totals otherwise.
pub fn validate_balance<L: VoucherLine>(lines: &[L]) -> Result<VoucherTotals, LedgerError> {
    let (debit, credit) = lines.iter().fold((Decimal::ZERO, Decimal::ZERO), |(d, c), line| {
        (d + to_storage(line.debit()), c + to_storage(line.credit()))
    });

    if debit == credit {
        Ok(VoucherTotals { debit, credit })
    } else {
        Err(LedgerError::Unbalanced { debit, credit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(debit: Decimal, credit: Decimal) -> VoucherAmounts {
        VoucherAmounts { debit, credit }
    }

    #[test]
    fn test_balanced_voucher() {
        let totals = validate_balance(&[
            line(dec!(100), dec!(0)),
            line(dec!(0), dec!(60)),
            line(dec!(0), dec!(40)),
        ])
        .unwrap();
        assert_eq!(totals.debit, dec!(100));
        assert_eq!(totals.credit, dec!(100));
    }

    #[test]
    fn test_unbalanced_voucher_reports_totals() {
        let err = validate_balance(&[line(dec!(100), dec!(0)), line(dec!(0), dec!(99.99))])
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Unbalanced {
                debit: dec!(100.00),
                credit: dec!(99.99),
            }
        );
    }

    #[test]
    fn test_scale_does_not_matter() {
        assert!(validate_balance(&[line(dec!(10.5), dec!(0)), line(dec!(0), dec!(10.5000))]).is_ok());
    }

    #[test]
    fn test_balance_uses_stored_amounts() {
        let err = validate_balance(&[
            line(dec!(0.00004), dec!(0)),
            line(dec!(0.00004), dec!(0)),
            line(dec!(0), dec!(0.00008)),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Unbalanced {
                debit: dec!(0),
                credit: dec!(0.0001),
            }
        );
    }

    #[test]
    fn test_empty_voucher_is_balanced() {
        let totals = validate_balance::<VoucherAmounts>(&[]).unwrap();
        assert_eq!(totals.debit, Decimal::ZERO);
    }
}
