//! Account history repository.
//!
//! Snapshots are append-only; a trigger rejects UPDATE and DELETE on
//! `account_histories`. Capture functions take the caller's connection so
//! the snapshot commits or rolls back with the account write it describes.

use chrono::{DateTime, Utc};
use coopledger_core::LedgerError;
use coopledger_core::account::Account;
use coopledger_core::history::{
    AccountSnapshot, HistoryFilter, SnapshotKind, reconstruct, reconstruct_all,
};
use coopledger_shared::types::{AccountId, BranchId, OrganizationId, UserId};
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, IsolationLevel, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::debug;

use super::account::{find_account_in, list_accounts_in};
use super::db_now;
use crate::entities::account_histories;
use crate::error::StoreError;

/// Account history repository.
#[derive(Debug, Clone)]
pub struct AccountHistoryRepository {
    db: DatabaseConnection,
}

impl AccountHistoryRepository {
    /// Creates a new account history repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records the state of a freshly created account.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn record_creation<C>(
        &self,
        conn: &C,
        account: &Account,
        actor: UserId,
    ) -> Result<AccountSnapshot, StoreError>
    where
        C: ConnectionTrait,
    {
        record_creation_image(conn, account, actor).await
    }

    /// Records the current state of an account that is about to be updated.
    ///
    /// Returns `Ok(None)` without writing anything when the account does not
    /// exist in the given organization and branch.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn record_before_update<C>(
        &self,
        conn: &C,
        account_id: AccountId,
        organization_id: OrganizationId,
        branch_id: BranchId,
        actor: UserId,
    ) -> Result<Option<AccountSnapshot>, StoreError>
    where
        C: ConnectionTrait,
    {
        let Some(current) = find_account_in(conn, account_id, organization_id, branch_id).await?
        else {
            debug!(%account_id, "No account to snapshot before update");
            return Ok(None);
        };
        let snapshot = record_before_image(conn, &current, actor, db_now()).await?;
        Ok(Some(snapshot))
    }

    /// Rebuilds an account as it was at `as_of`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::HistoryNotFound` when no recorded state covers
    /// `as_of`, or an error if a query fails.
    pub async fn reconstruct(
        &self,
        account_id: AccountId,
        organization_id: OrganizationId,
        branch_id: BranchId,
        as_of: DateTime<Utc>,
    ) -> Result<Account, StoreError> {
        let view = self.read_view().await?;
        let current = find_account_in(&view, account_id, organization_id, branch_id).await?;
        let snapshots = list_history_in(&view, account_id, organization_id, branch_id).await?;
        view.commit().await?;

        reconstruct(&snapshots, current.as_ref(), as_of)
            .ok_or_else(|| LedgerError::HistoryNotFound { account_id, as_of }.into())
    }

    /// Rebuilds every account of a branch as it was at `as_of`.
    ///
    /// The filter applies to the reconstructed state; results are in chart
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn reconstruct_all_for_scope(
        &self,
        organization_id: OrganizationId,
        branch_id: BranchId,
        as_of: DateTime<Utc>,
        filter: HistoryFilter,
    ) -> Result<Vec<Account>, StoreError> {
        let view = self.read_view().await?;
        let current = list_accounts_in(&view, organization_id, branch_id).await?;
        let snapshots: Vec<AccountSnapshot> = account_histories::Entity::find()
            .filter(account_histories::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(account_histories::Column::BranchId.eq(branch_id.into_inner()))
            .all(&view)
            .await?
            .into_iter()
            .map(AccountSnapshot::try_from)
            .collect::<Result<_, _>>()?;
        view.commit().await?;

        Ok(reconstruct_all(&snapshots, &current, as_of, filter))
    }

    /// Lists the snapshots of an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a row cannot be decoded.
    pub async fn list_history(
        &self,
        account_id: AccountId,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> Result<Vec<AccountSnapshot>, StoreError> {
        list_history_in(&self.db, account_id, organization_id, branch_id).await
    }

    /// Opens a read-only transaction in which the account rows and their
    /// snapshots are seen as of one moment.
    async fn read_view(&self) -> Result<DatabaseTransaction, DbErr> {
        self.db
            .begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            )
            .await
    }
}

async fn list_history_in<C>(
    conn: &C,
    account_id: AccountId,
    organization_id: OrganizationId,
    branch_id: BranchId,
) -> Result<Vec<AccountSnapshot>, StoreError>
where
    C: ConnectionTrait,
{
    account_histories::Entity::find()
        .filter(account_histories::Column::AccountId.eq(account_id.into_inner()))
        .filter(account_histories::Column::OrganizationId.eq(organization_id.into_inner()))
        .filter(account_histories::Column::BranchId.eq(branch_id.into_inner()))
        .order_by_desc(account_histories::Column::CreatedAt)
        .order_by_desc(account_histories::Column::UpdatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(AccountSnapshot::try_from)
        .collect()
}

async fn insert_snapshot<C>(conn: &C, snapshot: &AccountSnapshot) -> Result<(), StoreError>
where
    C: ConnectionTrait,
{
    account_histories::ActiveModel::try_from(snapshot)?
        .insert(conn)
        .await?;
    debug!(
        account_id = %snapshot.account_id,
        kind = snapshot.kind.as_str(),
        at = %snapshot.created_at,
        "Recorded account snapshot"
    );
    Ok(())
}

/// Writes the `Created` image of a new account, stamped with its creation time.
pub(crate) async fn record_creation_image<C>(
    conn: &C,
    account: &Account,
    actor: UserId,
) -> Result<AccountSnapshot, StoreError>
where
    C: ConnectionTrait,
{
    let snapshot =
        AccountSnapshot::capture(account, SnapshotKind::Created, actor, account.created_at);
    insert_snapshot(conn, &snapshot).await?;
    Ok(snapshot)
}

/// Writes the before-image of `current`, stamped with the update time.
pub(crate) async fn record_before_image<C>(
    conn: &C,
    current: &Account,
    actor: UserId,
    at: DateTime<Utc>,
) -> Result<AccountSnapshot, StoreError>
where
    C: ConnectionTrait,
{
    let snapshot = AccountSnapshot::capture(current, SnapshotKind::BeforeUpdate, actor, at);
    insert_snapshot(conn, &snapshot).await?;
    Ok(snapshot)
}
