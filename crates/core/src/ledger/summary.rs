//! Per-member accounting ledger summary.

use chrono::{DateTime, Utc};
use coopledger_shared::types::{
    AccountId, BranchId, MemberLedgerId, MemberProfileId, OrganizationId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::GeneralLedgerEntry;

/// Current position of one member in one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLedgerSummary {
    /// Summary id.
    pub id: MemberLedgerId,
    /// Organization.
    pub organization_id: OrganizationId,
    /// Branch.
    pub branch_id: BranchId,
    /// Member.
    pub member_profile_id: MemberProfileId,
    /// Account.
    pub account_id: AccountId,
    /// Number of postings applied.
    pub count: i64,
    /// Balance after the latest posting.
    pub balance: Decimal,
    /// Time of the latest posting.
    pub last_pay: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Creator.
    pub created_by: UserId,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Last updater.
    pub updated_by: UserId,
}

/// What one posting contributes to a member summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryUpdate {
    /// Organization.
    pub organization_id: OrganizationId,
    /// Branch.
    pub branch_id: BranchId,
    /// Member.
    pub member_profile_id: MemberProfileId,
    /// Account.
    pub account_id: AccountId,
    /// Running balance after the posting.
    pub balance: Decimal,
    /// When the posting happened.
    pub paid_at: DateTime<Utc>,
    /// Who posted it.
    pub actor: UserId,
}

impl SummaryUpdate {
    /// Summary contribution of a posted entry; `None` without a member.
    #[must_use]
    pub fn from_entry(entry: &GeneralLedgerEntry) -> Option<Self> {
        entry.member_profile_id.map(|member_profile_id| Self {
            organization_id: entry.organization_id,
            branch_id: entry.branch_id,
            member_profile_id,
            account_id: entry.account_id,
            balance: entry.balance,
            paid_at: entry.created_at,
            actor: entry.created_by,
        })
    }
}

impl MemberLedgerSummary {
    /// Opens a summary from the member's first posting.
    #[must_use]
    pub fn open(update: &SummaryUpdate) -> Self {
        Self {
            id: MemberLedgerId::new(),
            organization_id: update.organization_id,
            branch_id: update.branch_id,
            member_profile_id: update.member_profile_id,
            account_id: update.account_id,
            count: 1,
            balance: update.balance,
            last_pay: Some(update.paid_at),
            created_at: update.paid_at,
            created_by: update.actor,
            updated_at: update.paid_at,
            updated_by: update.actor,
        }
    }

    /// Applies a subsequent posting.
    pub fn apply(&mut self, update: &SummaryUpdate) {
        self.count += 1;
        self.balance = update.balance;
        self.last_pay = Some(update.paid_at);
        self.updated_at = update.paid_at;
        self.updated_by = update.actor;
    }
}
