//! Chart of accounts ordering.
//!
//! Both operations take the branch's chart advisory lock, so a reindex and
//! an insertion never interleave within one branch.

use coopledger_core::account::{
    Account, GeneralLedgerType, IndexAssignment, insertion_index, reindex,
};
use coopledger_core::events::AccountChanged;
use coopledger_shared::types::{BranchId, OrganizationId, UserId};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    TransactionTrait,
};
use tracing::{debug, info};

use super::account::write_update;
use super::db_now;
use crate::entities::accounts;
use crate::error::StoreError;
use crate::lock::{acquire_xact_lock, chart_lock_name};

/// Result of a full reindex.
#[derive(Debug, Clone, Default)]
pub struct ReindexOutcome {
    /// New index of every account, in chart order.
    pub assignments: Vec<IndexAssignment>,
    /// One event per account whose index changed.
    pub changes: Vec<AccountChanged>,
}

impl ReindexOutcome {
    /// Number of accounts whose index changed.
    #[must_use]
    pub fn changed(&self) -> usize {
        self.changes.len()
    }
}

/// Account ordering repository.
#[derive(Debug, Clone)]
pub struct AccountIndexRepository {
    db: DatabaseConnection,
}

impl AccountIndexRepository {
    /// Creates a new account index repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Renumbers every account of a branch densely in chart order.
    ///
    /// Runs in one transaction; accounts whose index changes get a
    /// before-image like any other update.
    ///
    /// # Errors
    ///
    /// Returns an error if a query or write fails. Nothing is persisted in
    /// that case.
    pub async fn reindex_all(
        &self,
        organization_id: OrganizationId,
        branch_id: BranchId,
        actor: UserId,
    ) -> Result<ReindexOutcome, StoreError> {
        let txn = self.db.begin().await?;
        acquire_xact_lock(&txn, &chart_lock_name(organization_id, branch_id)).await?;

        let accounts: Vec<Account> = branch_accounts(organization_id, branch_id)
            .lock_exclusive()
            .all(&txn)
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect::<Result<_, _>>()?;

        let assignments = reindex(&accounts);
        let now = db_now();
        let mut changes = Vec::new();

        for assignment in assignments.iter().filter(|a| a.is_changed()) {
            let Some(before) = accounts.iter().find(|a| a.id == assignment.account_id) else {
                continue;
            };
            let mut attributes = before.attributes.clone();
            attributes.index = assignment.index;
            let after = write_update(&txn, before, attributes, actor, now).await?;
            debug!(
                account_id = %assignment.account_id,
                previous = %assignment.previous,
                index = %assignment.index,
                "Reindexed account"
            );
            changes.push(AccountChanged {
                before: Some(before.clone()),
                after: Some(after),
            });
        }

        txn.commit().await?;

        info!(
            %organization_id,
            %branch_id,
            accounts = assignments.len(),
            changed = changes.len(),
            "Reindexed chart of accounts"
        );
        Ok(ReindexOutcome {
            assignments,
            changes,
        })
    }

    /// Computes the index a new account named `name` should take in its
    /// general-ledger group.
    ///
    /// Nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn compute_insert_index(
        &self,
        organization_id: OrganizationId,
        branch_id: BranchId,
        general_ledger_type: Option<GeneralLedgerType>,
        name: &str,
    ) -> Result<Decimal, StoreError> {
        let txn = self.db.begin().await?;
        acquire_xact_lock(&txn, &chart_lock_name(organization_id, branch_id)).await?;
        let index =
            insertion_index_in(&txn, organization_id, branch_id, general_ledger_type, name).await?;
        txn.commit().await?;
        Ok(index)
    }
}

fn branch_accounts(
    organization_id: OrganizationId,
    branch_id: BranchId,
) -> sea_orm::Select<accounts::Entity> {
    accounts::Entity::find()
        .filter(accounts::Column::OrganizationId.eq(organization_id.into_inner()))
        .filter(accounts::Column::BranchId.eq(branch_id.into_inner()))
}

async fn insertion_index_in<C>(
    conn: &C,
    organization_id: OrganizationId,
    branch_id: BranchId,
    general_ledger_type: Option<GeneralLedgerType>,
    name: &str,
) -> Result<Decimal, StoreError>
where
    C: ConnectionTrait,
{
    let query = branch_accounts(organization_id, branch_id);
    let query = match general_ledger_type {
        Some(gl) => query.filter(accounts::Column::GeneralLedgerType.eq(gl.as_str())),
        None => query.filter(accounts::Column::GeneralLedgerType.is_null()),
    };

    let siblings: Vec<Account> = query
        .all(conn)
        .await?
        .into_iter()
        .map(Account::try_from)
        .collect::<Result<_, _>>()?;

    let index = insertion_index(&siblings, name);
    debug!(
        %organization_id,
        %branch_id,
        siblings = siblings.len(),
        %index,
        "Computed insertion index"
    );
    Ok(index)
}
