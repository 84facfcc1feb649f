//! Account repository for chart of accounts database operations.
//!
//! Every update goes through [`write_update`], which records the
//! before-image in the same transaction as the row change.

use chrono::{DateTime, Utc};
use coopledger_core::LedgerError;
use coopledger_core::account::{
    Account, AccountAttributes, AccountReferences, chart_order, check_deletable,
};
use coopledger_core::events::AccountChanged;
use coopledger_shared::types::{AccountId, BranchId, OrganizationId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use tracing::info;

use super::account_history::{record_before_image, record_creation_image};
use super::branch_settings::find_references;
use super::db_now;
use crate::entities::{accounts, general_ledger_entries};
use crate::error::StoreError;

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Organization ID.
    pub organization_id: OrganizationId,
    /// Branch ID.
    pub branch_id: BranchId,
    /// Account attributes, including its sort index.
    pub attributes: AccountAttributes,
    /// User creating the account.
    pub created_by: UserId,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account and records its `Created` snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced loan account does not exist or the
    /// write fails.
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<(Account, AccountChanged), StoreError> {
        let account = Account::new(
            input.organization_id,
            input.branch_id,
            input.attributes,
            input.created_by,
            db_now(),
        );

        let txn = self.db.begin().await?;
        accounts::ActiveModel::from(&account).insert(&txn).await?;
        record_creation_image(&txn, &account, input.created_by).await?;
        txn.commit().await?;

        info!(
            account_id = %account.id,
            organization_id = %account.organization_id,
            branch_id = %account.branch_id,
            name = %account.attributes.name,
            "Created account"
        );

        let event = AccountChanged {
            before: None,
            after: Some(account.clone()),
        };
        Ok((account, event))
    }

    /// Finds an account by id within an organization and branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_account(
        &self,
        account_id: AccountId,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> Result<Option<Account>, StoreError> {
        find_account_in(&self.db, account_id, organization_id, branch_id).await
    }

    /// Lists the accounts of a branch in chart order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_accounts(
        &self,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> Result<Vec<Account>, StoreError> {
        list_accounts_in(&self.db, organization_id, branch_id).await
    }

    /// Row-locks an account for the rest of `txn`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` if the account is not in the
    /// given organization and branch.
    pub async fn lock_account(
        &self,
        txn: &DatabaseTransaction,
        account_id: AccountId,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> Result<Account, StoreError> {
        lock_account_in(txn, account_id, organization_id, branch_id).await
    }

    /// Row-locks an account and checks it still matches `expected`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` if the account is gone and
    /// `LedgerError::AccountChanged` if its organization, branch or type no
    /// longer match.
    pub async fn lock_account_validated(
        &self,
        txn: &DatabaseTransaction,
        expected: &Account,
    ) -> Result<Account, StoreError> {
        let model = accounts::Entity::find_by_id(expected.id.into_inner())
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(LedgerError::AccountNotFound(expected.id))?;
        let locked = Account::try_from(model)?;

        if !locked.is_in_scope(expected.organization_id, expected.branch_id)
            || locked.attributes.account_type != expected.attributes.account_type
        {
            return Err(LedgerError::AccountChanged(expected.id).into());
        }
        Ok(locked)
    }

    /// Applies `change` to an account's attributes.
    ///
    /// The account row is locked, its before-image is recorded and the new
    /// state is written, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` if the account does not exist
    /// in the given organization and branch, or an error if a write fails.
    pub async fn update_account<F>(
        &self,
        account_id: AccountId,
        organization_id: OrganizationId,
        branch_id: BranchId,
        actor: UserId,
        change: F,
    ) -> Result<(Account, AccountChanged), StoreError>
    where
        F: FnOnce(&mut AccountAttributes) + Send,
    {
        let txn = self.db.begin().await?;
        let before = lock_account_in(&txn, account_id, organization_id, branch_id).await?;

        let mut attributes = before.attributes.clone();
        change(&mut attributes);
        let after = write_update(&txn, &before, attributes, actor, db_now()).await?;
        txn.commit().await?;

        info!(%account_id, %actor, "Updated account");
        let event = AccountChanged {
            before: Some(before),
            after: Some(after.clone()),
        };
        Ok((after, event))
    }

    /// Deletes an account that nothing references.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` if the account does not exist,
    /// `LedgerError::AccountInUse` if ledger entries, branch settings or
    /// linked accounts still point at it, or an error if a query fails.
    pub async fn delete_account(
        &self,
        account_id: AccountId,
        organization_id: OrganizationId,
        branch_id: BranchId,
        actor: UserId,
    ) -> Result<AccountChanged, StoreError> {
        let txn = self.db.begin().await?;
        let account = lock_account_in(&txn, account_id, organization_id, branch_id).await?;

        let ledger_entries = general_ledger_entries::Entity::find()
            .filter(general_ledger_entries::Column::AccountId.eq(account_id.into_inner()))
            .count(&txn)
            .await?;
        let linked_accounts = accounts::Entity::find()
            .filter(accounts::Column::LoanAccountId.eq(account_id.into_inner()))
            .count(&txn)
            .await?;
        let references = AccountReferences {
            ledger_entries,
            branch: find_references(&txn, organization_id, branch_id).await?,
            linked_accounts,
        };
        check_deletable(account_id, &references)?;

        accounts::Entity::delete_by_id(account_id.into_inner())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(%account_id, %actor, "Deleted account");
        Ok(AccountChanged {
            before: Some(account),
            after: None,
        })
    }
}

pub(crate) async fn find_account_in<C>(
    conn: &C,
    account_id: AccountId,
    organization_id: OrganizationId,
    branch_id: BranchId,
) -> Result<Option<Account>, StoreError>
where
    C: ConnectionTrait,
{
    accounts::Entity::find_by_id(account_id.into_inner())
        .filter(accounts::Column::OrganizationId.eq(organization_id.into_inner()))
        .filter(accounts::Column::BranchId.eq(branch_id.into_inner()))
        .one(conn)
        .await?
        .map(Account::try_from)
        .transpose()
}

pub(crate) async fn lock_account_in<C>(
    conn: &C,
    account_id: AccountId,
    organization_id: OrganizationId,
    branch_id: BranchId,
) -> Result<Account, StoreError>
where
    C: ConnectionTrait,
{
    let model = accounts::Entity::find_by_id(account_id.into_inner())
        .filter(accounts::Column::OrganizationId.eq(organization_id.into_inner()))
        .filter(accounts::Column::BranchId.eq(branch_id.into_inner()))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(LedgerError::AccountNotFound(account_id))?;
    Account::try_from(model)
}

pub(crate) async fn list_accounts_in<C>(
    conn: &C,
    organization_id: OrganizationId,
    branch_id: BranchId,
) -> Result<Vec<Account>, StoreError>
where
    C: ConnectionTrait,
{
    let mut accounts = accounts::Entity::find()
        .filter(accounts::Column::OrganizationId.eq(organization_id.into_inner()))
        .filter(accounts::Column::BranchId.eq(branch_id.into_inner()))
        .all(conn)
        .await?
        .into_iter()
        .map(Account::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    accounts.sort_by(chart_order);
    Ok(accounts)
}

/// Records the before-image of `before`, then writes `attributes` over it.
///
/// `before` must be the row as currently stored, read under a lock held by
/// `conn`'s transaction.
pub(crate) async fn write_update<C>(
    conn: &C,
    before: &Account,
    attributes: AccountAttributes,
    actor: UserId,
    at: DateTime<Utc>,
) -> Result<Account, StoreError>
where
    C: ConnectionTrait,
{
    record_before_image(conn, before, actor, at).await?;

    let after = Account {
        attributes,
        updated_at: at,
        updated_by: actor,
        ..before.clone()
    };
    accounts::ActiveModel::from(&after).update(conn).await?;
    Ok(after)
}
