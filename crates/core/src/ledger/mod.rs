//! General ledger posting logic.
//!
//! This module implements the pure side of posting:
//! - Ledger entry and scope types
//! - Balance sign convention and daily ending balances
//! - Running balance computation with branch balance policies
//! - Voucher balance validation
//! - Member sub-ledger summaries

pub mod balance;
pub mod posting;
pub mod summary;
pub mod types;
pub mod voucher;

#[cfg(test)]
mod posting_props;

pub use balance::{DailyBalance, NormalBalance, balance_change, daily_ending_balances};
pub use posting::{PostingComputation, compute_posting};
pub use summary::{MemberLedgerSummary, SummaryUpdate};
pub use types::{
    BranchPolicy, CollectionCategory, GeneralLedgerEntry, GeneralLedgerSource, LedgerEntryDraft,
    LedgerScope, MemberScope, PriorEntry,
};
pub use voucher::{VoucherAmounts, VoucherLine, VoucherTotals, validate_balance};
