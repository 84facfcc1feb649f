//! Error type for repository operations.

use coopledger_core::{ErrorKind, LedgerError};
use sea_orm::DbErr;
use uuid::Uuid;

/// Errors returned by repositories.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// A stored row could not be mapped back to a domain type.
    #[error("Corrupt {table} row {id}: {reason}")]
    Corrupt {
        /// Table the row came from.
        table: &'static str,
        /// Row id.
        id: Uuid,
        /// What failed to parse.
        reason: String,
    },
}

impl StoreError {
    /// Returns the coarse classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger(err) => err.kind(),
            Self::Database(_) | Self::Corrupt { .. } => ErrorKind::Persistence,
        }
    }

    /// Returns true if repeating the whole transaction may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// Returns the domain error, if this is one.
    #[must_use]
    pub const fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            Self::Ledger(err) => Some(err),
            Self::Database(_) | Self::Corrupt { .. } => None,
        }
    }
}
