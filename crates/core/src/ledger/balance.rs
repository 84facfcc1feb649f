//! Running balance calculations.
//!
//! Sign convention:
//! - Assets/Expenses: balance += debit - credit (debit-normal)
//! - Liabilities/Equity/Revenue: balance += credit - debit (credit-normal)
//! - Unclassified accounts are treated as credit-normal.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::GeneralLedgerEntry;
use crate::account::GeneralLedgerType;
use crate::error::LedgerError;

/// Which side increases an account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalBalance {
    /// Debits increase the balance (Assets, Expenses).
    DebitNormal,
    /// Credits increase the balance (Liabilities, Equity, Revenue).
    CreditNormal,
}

impl NormalBalance {
    /// Normal side of an optional general-ledger classification.
    #[must_use]
    pub const fn for_ledger_type(general_ledger_type: Option<GeneralLedgerType>) -> Self {
        match general_ledger_type {
            Some(gl) if gl.is_debit_normal() => Self::DebitNormal,
            _ => Self::CreditNormal,
        }
    }

    /// Calculates the balance change for an entry.
    #[must_use]
    pub fn calculate_balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::DebitNormal => debit - credit,
            Self::CreditNormal => credit - debit,
        }
    }
}

/// Signed change a debit/credit pair makes to an account's balance.
#[must_use]
pub fn balance_change(
    general_ledger_type: Option<GeneralLedgerType>,
    debit: Decimal,
    credit: Decimal,
) -> Decimal {
    NormalBalance::for_ledger_type(general_ledger_type).calculate_balance_change(debit, credit)
}

/// Balance at the end of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBalance {
    /// The day (UTC).
    pub date: NaiveDate,
    /// Running balance after the day's last entry, or carried forward.
    pub balance: Decimal,
}

/// Computes end-of-day balances for every day in `from..=to`.
///
/// `starting_balance` is the balance of the last entry before `from`.
/// `entries` are the scope's entries inside the range, in any order; each
/// day takes the balance of its latest entry and days without entries carry
/// the previous balance forward.
///
/// # Errors
///
/// Returns `LedgerError::InvalidDateRange` if `to` is before `from`.
pub fn daily_ending_balances(
    starting_balance: Decimal,
    entries: &[GeneralLedgerEntry],
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DailyBalance>, LedgerError> {
    if to < from {
        return Err(LedgerError::InvalidDateRange { from, to });
    }

    let mut ordered: Vec<&GeneralLedgerEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| (e.created_at, e.scope_sequence));
    let mut pending = ordered.into_iter().peekable();

    let mut balances = Vec::new();
    let mut balance = starting_balance;
    let mut day = from;
    while day <= to {
        while let Some(entry) = pending.next_if(|e| e.created_at.date_naive() <= day) {
            balance = entry.balance;
        }
        balances.push(DailyBalance { date: day, balance });
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }

    Ok(balances)
}
