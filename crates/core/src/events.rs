//! Typed change notifications returned by mutating operations.
//!
//! Delivery (pub/sub, websockets, audit sinks) is left to the caller.

use coopledger_shared::types::{BranchId, OrganizationId};

use crate::account::Account;
use crate::ledger::{GeneralLedgerEntry, MemberLedgerSummary};

/// An account was created, updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountChanged {
    /// State before the change; `None` on creation.
    pub before: Option<Account>,
    /// State after the change; `None` on deletion.
    pub after: Option<Account>,
}

/// A ledger entry was posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPosted {
    /// The persisted entry.
    pub entry: GeneralLedgerEntry,
    /// The member summary after the posting, when one is kept.
    pub summary: Option<MemberLedgerSummary>,
}

/// Any change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// See [`AccountChanged`].
    AccountChanged(AccountChanged),
    /// See [`EntryPosted`].
    EntryPosted(EntryPosted),
}

impl LedgerEvent {
    /// Organization and branch the event belongs to, for routing.
    #[must_use]
    pub fn scope(&self) -> Option<(OrganizationId, BranchId)> {
        match self {
            Self::AccountChanged(change) => change
                .after
                .as_ref()
                .or(change.before.as_ref())
                .map(|a| (a.organization_id, a.branch_id)),
            Self::EntryPosted(posted) => {
                Some((posted.entry.organization_id, posted.entry.branch_id))
            }
        }
    }
}

impl From<AccountChanged> for LedgerEvent {
    fn from(change: AccountChanged) -> Self {
        Self::AccountChanged(change)
    }
}

impl From<EntryPosted> for LedgerEvent {
    fn from(posted: EntryPosted) -> Self {
        Self::EntryPosted(posted)
    }
}
