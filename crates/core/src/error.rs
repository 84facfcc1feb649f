//! Error types shared by the account, history and ledger modules.
//!
//! Every failure carries enough context (account, scope, attempted amounts)
//! for the caller to report it without re-querying. `ErrorKind` is the coarse
//! classification callers branch on, e.g. to decide whether a retry makes sense.

use chrono::{DateTime, NaiveDate, Utc};
use coopledger_shared::types::{AccountId, MemberProfileId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::DeletionBlocker;

/// Coarse classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced account or snapshot does not exist.
    NotFound,
    /// A branch balance policy rejected the posting.
    BalancePolicyViolation,
    /// Voucher debits and credits differ.
    Unbalanced,
    /// The store failed; the caller may retry the whole transaction.
    Persistence,
    /// Required input was absent.
    NilInput,
    /// Input was present but malformed.
    Validation,
    /// The operation conflicts with existing references.
    Conflict,
}

/// Which balance policy a posting violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// The new balance fell below the account's minimum amount.
    MaintainingBalance,
    /// The new balance went negative and the branch disallows it.
    NegativeBalance,
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MaintainingBalance => write!(f, "maintaining balance"),
            Self::NegativeBalance => write!(f, "negative balance"),
        }
    }
}

/// Details of a rejected posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyViolation {
    /// The policy that was violated.
    pub kind: PolicyKind,
    /// Account the posting targeted.
    pub account_id: AccountId,
    /// Member sub-ledger the posting targeted, if any.
    pub member_profile_id: Option<MemberProfileId>,
    /// Running balance before the posting.
    pub prior_balance: Decimal,
    /// Attempted debit.
    pub debit: Decimal,
    /// Attempted credit.
    pub credit: Decimal,
    /// Balance the posting would have produced.
    pub new_balance: Decimal,
    /// Threshold that was crossed (minimum amount, or zero).
    pub threshold: Decimal,
}

/// Errors that can occur in account, history and ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Input Errors ==========
    /// Required input was absent.
    #[error("Missing input: {0}")]
    NilInput(&'static str),

    /// Debit/credit magnitudes are negative, or both zero.
    #[error("Invalid entry amounts. Debit: {debit}, Credit: {credit}")]
    InvalidAmount {
        /// Attempted debit.
        debit: Decimal,
        /// Attempted credit.
        credit: Decimal,
    },

    /// A date range ends before it starts.
    #[error("Invalid date range: {to} is before {from}")]
    InvalidDateRange {
        /// Start of the range.
        from: NaiveDate,
        /// End of the range.
        to: NaiveDate,
    },

    // ========== Lookup Errors ==========
    /// Account not found in the given organization and branch.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// No history snapshot exists at or before the requested time.
    #[error("No history for account {account_id} as of {as_of}")]
    HistoryNotFound {
        /// Account that was looked up.
        account_id: AccountId,
        /// Requested point in time.
        as_of: DateTime<Utc>,
    },

    /// The locked account no longer matches the copy the caller holds.
    #[error("Account {0} changed scope or type while locked")]
    AccountChanged(AccountId),

    // ========== Business Rule Errors ==========
    /// A branch balance policy rejected the posting.
    #[error(
        "Posting violates {} policy on account {}: balance would be {} (threshold {})",
        .0.kind, .0.account_id, .0.new_balance, .0.threshold
    )]
    BalancePolicyViolation(Box<PolicyViolation>),

    /// Voucher debits and credits are not equal.
    #[error("Voucher is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit.
        debit: Decimal,
        /// Total credit.
        credit: Decimal,
    },

    /// Account cannot be deleted while something still references it.
    #[error("Account {account_id} cannot be deleted: {blocker}")]
    AccountInUse {
        /// Account that was to be deleted.
        account_id: AccountId,
        /// First reference found.
        blocker: DeletionBlocker,
    },

    // ========== Store Errors ==========
    /// Underlying store failure, already rendered to text.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl LedgerError {
    /// Returns the coarse classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NilInput(_) => ErrorKind::NilInput,
            Self::InvalidAmount { .. } | Self::InvalidDateRange { .. } => ErrorKind::Validation,
            Self::AccountNotFound(_) | Self::HistoryNotFound { .. } => ErrorKind::NotFound,
            Self::BalancePolicyViolation(_) => ErrorKind::BalancePolicyViolation,
            Self::Unbalanced { .. } => ErrorKind::Unbalanced,
            Self::AccountInUse { .. } | Self::AccountChanged(_) => ErrorKind::Conflict,
            Self::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// Returns a stable machine-readable code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NilInput(_) => "NIL_INPUT",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::HistoryNotFound { .. } => "HISTORY_NOT_FOUND",
            Self::AccountChanged(_) => "ACCOUNT_CHANGED",
            Self::BalancePolicyViolation(_) => "BALANCE_POLICY_VIOLATION",
            Self::Unbalanced { .. } => "UNBALANCED_VOUCHER",
            Self::AccountInUse { .. } => "ACCOUNT_IN_USE",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Returns true if repeating the whole transaction may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Persistence)
    }
}
