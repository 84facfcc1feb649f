//! General ledger repository: posting and ledger queries.
//!
//! Posting runs inside the caller's transaction:
//!
//! 1. Validate the draft and load the account.
//! 2. Derive the running-balance scope and take its advisory lock.
//! 3. Read the scope's latest entry `FOR UPDATE`.
//! 4. Compute the new balance and apply the branch balance policies.
//! 5. Insert the entry and, for member sub-ledgers, upsert the summary.
//!
//! Any error leaves the transaction for the caller to roll back.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, SubsecRound, Utc};
use coopledger_core::LedgerError;
use coopledger_core::events::EntryPosted;
use coopledger_core::ledger::{
    CollectionCategory, DailyBalance, GeneralLedgerEntry, LedgerEntryDraft, LedgerScope,
    MemberScope, PriorEntry, SummaryUpdate, compute_posting, daily_ending_balances,
    validate_balance,
};
use coopledger_shared::types::{
    AccountId, BranchId, LedgerEntryId, MemberProfileId, OrganizationId, to_storage,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    TransactionTrait,
};
use tracing::{info, warn};

use super::account::find_account_in;
use super::branch_settings::find_policy;
use super::db_now;
use super::member_ledger::upsert_balance;
use crate::entities::general_ledger_entries::{self, Column, Entity};
use crate::error::StoreError;
use crate::lock::{acquire_xact_lock, scope_lock_name};

/// General ledger repository.
#[derive(Debug, Clone)]
pub struct GeneralLedgerRepository {
    db: DatabaseConnection,
}

impl GeneralLedgerRepository {
    /// Creates a new general ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts one entry inside `txn`.
    ///
    /// Concurrent posts to the same scope are serialized; the second one
    /// waits until the first transaction ends and then builds on its balance.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidAmount` for negative or all-zero amounts
    /// - `LedgerError::AccountNotFound` if the account is not in the entry's
    ///   organization and branch
    /// - `LedgerError::BalancePolicyViolation` if a branch policy rejects
    ///   the resulting balance
    /// - `StoreError::Database` if a query fails
    pub async fn post(
        &self,
        txn: &DatabaseTransaction,
        draft: &LedgerEntryDraft,
    ) -> Result<EntryPosted, StoreError> {
        post_in(txn, draft).await
    }

    /// Posts a balanced batch of entries inside `txn`.
    ///
    /// Entries are posted in account order so that concurrent vouchers lock
    /// scopes in the same sequence; events come back in input order.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NilInput` for an empty batch,
    /// `LedgerError::Unbalanced` if debits and credits differ, or any error
    /// of [`Self::post`].
    pub async fn post_voucher(
        &self,
        txn: &DatabaseTransaction,
        drafts: &[LedgerEntryDraft],
    ) -> Result<Vec<EntryPosted>, StoreError> {
        if drafts.is_empty() {
            return Err(LedgerError::NilInput("voucher entries").into());
        }
        let totals = validate_balance(drafts)?;

        let mut order: Vec<usize> = (0..drafts.len()).collect();
        order.sort_by_key(|&i| {
            (
                drafts[i].account_id.into_inner(),
                drafts[i].member_profile_id.map(MemberProfileId::into_inner),
            )
        });

        let mut posted: Vec<Option<EntryPosted>> = vec![None; drafts.len()];
        for i in order {
            posted[i] = Some(post_in(txn, &drafts[i]).await?);
        }

        info!(
            entries = drafts.len(),
            debit = %totals.debit,
            credit = %totals.credit,
            "Posted voucher"
        );
        Ok(posted.into_iter().flatten().collect())
    }

    /// Posts one entry in its own transaction.
    ///
    /// # Errors
    ///
    /// Same as [`Self::post`]; nothing is written on error.
    pub async fn post_and_commit(
        &self,
        draft: &LedgerEntryDraft,
    ) -> Result<EntryPosted, StoreError> {
        let txn = self.db.begin().await?;
        let posted = post_in(&txn, draft).await?;
        txn.commit().await?;
        Ok(posted)
    }

    /// Returns the current entry of a member in an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn latest_for_member_account(
        &self,
        member_profile_id: MemberProfileId,
        account_id: AccountId,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> Result<Option<GeneralLedgerEntry>, StoreError> {
        member_account_query(member_profile_id, account_id, organization_id, branch_id)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::ScopeSequence)
            .one(&self.db)
            .await?
            .map(GeneralLedgerEntry::try_from)
            .transpose()
    }

    /// Lists a member's entries in an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn member_account_entries(
        &self,
        member_profile_id: MemberProfileId,
        account_id: AccountId,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> Result<Vec<GeneralLedgerEntry>, StoreError> {
        member_account_query(member_profile_id, account_id, organization_id, branch_id)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::ScopeSequence)
            .all(&self.db)
            .await?
            .into_iter()
            .map(GeneralLedgerEntry::try_from)
            .collect()
    }

    /// End-of-day balances of one scope for every day in `from..=to`.
    ///
    /// The scope is derived from the account exactly as posting derives it.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidDateRange` if `to` is before `from`,
    /// `LedgerError::AccountNotFound` if the account does not exist, or an
    /// error if a query fails.
    pub async fn daily_ending_balances(
        &self,
        account_id: AccountId,
        member_profile_id: Option<MemberProfileId>,
        organization_id: OrganizationId,
        branch_id: BranchId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyBalance>, StoreError> {
        if to < from {
            return Err(LedgerError::InvalidDateRange { from, to }.into());
        }
        let account = find_account_in(&self.db, account_id, organization_id, branch_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        let scope = LedgerScope::for_posting(&account, organization_id, branch_id, member_profile_id);

        let (start, _) = day_bounds(from);
        let (_, end) = day_bounds(to);

        let starting_balance = Entity::find()
            .filter(scope_condition(&scope))
            .filter(Column::CreatedAt.lt(start))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::ScopeSequence)
            .one(&self.db)
            .await?
            .map_or(Decimal::ZERO, |row| row.balance);

        let mut in_range = Entity::find()
            .filter(scope_condition(&scope))
            .filter(Column::CreatedAt.gte(start));
        if let Some(end) = end {
            in_range = in_range.filter(Column::CreatedAt.lt(end));
        }
        let entries = in_range
            .all(&self.db)
            .await?
            .into_iter()
            .map(GeneralLedgerEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(daily_ending_balances(starting_balance, &entries, from, to)?)
    }

    /// Entries of one business day whose source belongs to `category`.
    ///
    /// Ordered by entry date.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn daily_collection(
        &self,
        organization_id: OrganizationId,
        branch_id: BranchId,
        date: NaiveDate,
        category: CollectionCategory,
    ) -> Result<Vec<GeneralLedgerEntry>, StoreError> {
        let (start, end) = day_bounds(date);
        let sources = category.sources().iter().map(|s| s.as_str());

        let mut query = Entity::find()
            .filter(Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(Column::BranchId.eq(branch_id.into_inner()))
            .filter(Column::Source.is_in(sources))
            .filter(Column::EntryDate.gte(start));
        if let Some(end) = end {
            query = query.filter(Column::EntryDate.lt(end));
        }

        query
            .order_by_asc(Column::EntryDate)
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(GeneralLedgerEntry::try_from)
            .collect()
    }
}

async fn post_in(
    txn: &DatabaseTransaction,
    draft: &LedgerEntryDraft,
) -> Result<EntryPosted, StoreError> {
    draft.validate()?;

    let account = find_account_in(txn, draft.account_id, draft.organization_id, draft.branch_id)
        .await?
        .ok_or(LedgerError::AccountNotFound(draft.account_id))?;
    let scope = LedgerScope::for_posting(
        &account,
        draft.organization_id,
        draft.branch_id,
        draft.member_profile_id,
    );

    acquire_xact_lock(txn, &scope_lock_name(&scope)).await?;
    let prior = latest_in_scope(txn, &scope).await?;
    let policy = find_policy(txn, draft.organization_id, draft.branch_id).await?;

    let prior_entry = prior.as_ref().map(PriorEntry::from);
    let computation =
        match compute_posting(&account, &scope, prior_entry.as_ref(), draft, policy) {
            Ok(computation) => computation,
            Err(err) => {
                warn!(
                    account_id = %draft.account_id,
                    scope = %scope.canonical(),
                    debit = %draft.debit,
                    credit = %draft.credit,
                    error = %err,
                    "Posting rejected"
                );
                return Err(err.into());
            }
        };

    // Keeps created_at monotonic within the scope even if clocks step back.
    let now = db_now();
    let created_at = prior.as_ref().map_or(now, |p| now.max(p.created_at));

    let entry = GeneralLedgerEntry {
        id: LedgerEntryId::new(),
        organization_id: draft.organization_id,
        branch_id: draft.branch_id,
        account_id: draft.account_id,
        member_profile_id: draft.member_profile_id,
        debit: to_storage(draft.debit),
        credit: to_storage(draft.credit),
        balance: to_storage(computation.new_balance),
        scope_sequence: computation.scope_sequence,
        source: draft.source,
        entry_date: draft.entry_date.trunc_subsecs(6),
        created_at,
        created_by: draft.posted_by,
        payment_type_id: draft.payment_type_id,
        transaction_id: draft.transaction_id,
        reference_number: draft.reference_number.clone(),
        description: draft.description.clone(),
    };
    general_ledger_entries::ActiveModel::from(&entry)
        .insert(txn)
        .await?;

    let summary = match SummaryUpdate::from_entry(&entry) {
        Some(update) if account.attributes.account_type.has_member_sub_ledger() => {
            Some(upsert_balance(txn, &update).await?)
        }
        _ => None,
    };

    info!(
        entry_id = %entry.id,
        account_id = %entry.account_id,
        source = entry.source.as_str(),
        scope_sequence = entry.scope_sequence,
        prior_balance = %computation.prior_balance,
        balance = %entry.balance,
        "Posted ledger entry"
    );
    Ok(EntryPosted { entry, summary })
}

/// Latest entry of `scope`, row-locked for the rest of the transaction.
async fn latest_in_scope<C>(
    conn: &C,
    scope: &LedgerScope,
) -> Result<Option<GeneralLedgerEntry>, StoreError>
where
    C: ConnectionTrait,
{
    Entity::find()
        .filter(scope_condition(scope))
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::ScopeSequence)
        .lock_exclusive()
        .one(conn)
        .await?
        .map(GeneralLedgerEntry::try_from)
        .transpose()
}

fn scope_condition(scope: &LedgerScope) -> Condition {
    let condition = Condition::all()
        .add(Column::OrganizationId.eq(scope.organization_id.into_inner()))
        .add(Column::BranchId.eq(scope.branch_id.into_inner()))
        .add(Column::AccountId.eq(scope.account_id.into_inner()));
    match scope.member {
        MemberScope::AllMembers => condition,
        MemberScope::Member(id) => condition.add(Column::MemberProfileId.eq(id.into_inner())),
        MemberScope::NoMember => condition.add(Column::MemberProfileId.is_null()),
    }
}

fn member_account_query(
    member_profile_id: MemberProfileId,
    account_id: AccountId,
    organization_id: OrganizationId,
    branch_id: BranchId,
) -> Select<Entity> {
    Entity::find()
        .filter(Column::OrganizationId.eq(organization_id.into_inner()))
        .filter(Column::BranchId.eq(branch_id.into_inner()))
        .filter(Column::AccountId.eq(account_id.into_inner()))
        .filter(Column::MemberProfileId.eq(member_profile_id.into_inner()))
}

/// UTC start of `date` and of the following day, if representable.
fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = date
        .checked_add_days(Days::new(1))
        .map(|next| next.and_time(NaiveTime::MIN).and_utc());
    (start, end)
}
