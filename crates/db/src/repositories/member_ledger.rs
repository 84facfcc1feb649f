//! Member accounting ledger summaries.
//!
//! One row per (member, account, organization, branch), kept in step with
//! the general ledger by [`upsert_balance`] inside the posting transaction.

use coopledger_core::ledger::{MemberLedgerSummary, SummaryUpdate};
use coopledger_shared::types::{AccountId, BranchId, MemberProfileId, OrganizationId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Select,
};
use tracing::debug;

use crate::entities::member_accounting_ledgers;
use crate::error::StoreError;

/// Member ledger summary repository.
#[derive(Debug, Clone)]
pub struct MemberLedgerRepository {
    db: DatabaseConnection,
}

impl MemberLedgerRepository {
    /// Creates a new member ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the summary of a member in an account, if any posting exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_summary(
        &self,
        organization_id: OrganizationId,
        branch_id: BranchId,
        member_profile_id: MemberProfileId,
        account_id: AccountId,
    ) -> Result<Option<MemberLedgerSummary>, StoreError> {
        let row = summary_query(organization_id, branch_id, member_profile_id, account_id)
            .one(&self.db)
            .await?;
        Ok(row.map(MemberLedgerSummary::from))
    }

    /// Applies `update` to the member summary, creating it on first use.
    ///
    /// Must run in the same transaction as the posting that produced
    /// `update`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn upsert_balance<C>(
        &self,
        conn: &C,
        update: &SummaryUpdate,
    ) -> Result<MemberLedgerSummary, StoreError>
    where
        C: ConnectionTrait,
    {
        upsert_balance(conn, update).await
    }
}

fn summary_query(
    organization_id: OrganizationId,
    branch_id: BranchId,
    member_profile_id: MemberProfileId,
    account_id: AccountId,
) -> Select<member_accounting_ledgers::Entity> {
    member_accounting_ledgers::Entity::find()
        .filter(member_accounting_ledgers::Column::OrganizationId.eq(organization_id.into_inner()))
        .filter(member_accounting_ledgers::Column::BranchId.eq(branch_id.into_inner()))
        .filter(
            member_accounting_ledgers::Column::MemberProfileId.eq(member_profile_id.into_inner()),
        )
        .filter(member_accounting_ledgers::Column::AccountId.eq(account_id.into_inner()))
}

/// Locks and updates the summary row, or inserts it.
///
/// The caller already holds the ledger scope lock for this member and
/// account, so two postings cannot race to insert the same row.
pub(crate) async fn upsert_balance<C>(
    conn: &C,
    update: &SummaryUpdate,
) -> Result<MemberLedgerSummary, StoreError>
where
    C: ConnectionTrait,
{
    let existing = summary_query(
        update.organization_id,
        update.branch_id,
        update.member_profile_id,
        update.account_id,
    )
    .lock_exclusive()
    .one(conn)
    .await?;

    let summary = if let Some(row) = existing {
        let mut summary = MemberLedgerSummary::from(row);
        summary.apply(update);
        member_accounting_ledgers::ActiveModel::from(&summary)
            .update(conn)
            .await?;
        summary
    } else {
        let summary = MemberLedgerSummary::open(update);
        member_accounting_ledgers::ActiveModel::from(&summary)
            .insert(conn)
            .await?;
        summary
    };

    debug!(
        member_profile_id = %summary.member_profile_id,
        account_id = %summary.account_id,
        count = summary.count,
        balance = %summary.balance,
        "Updated member ledger summary"
    );
    Ok(summary)
}
