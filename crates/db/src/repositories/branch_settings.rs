//! Branch posting policy and singleton account references.

use chrono::Utc;
use coopledger_core::account::BranchAccountReferences;
use coopledger_core::ledger::BranchPolicy;
use coopledger_shared::types::{BranchId, OrganizationId};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Set};
use tracing::info;

use crate::entities::branch_settings;
use crate::error::StoreError;

/// Settings of one branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchSettings {
    /// Organization.
    pub organization_id: OrganizationId,
    /// Branch.
    pub branch_id: BranchId,
    /// Posting policy flags.
    pub policy: BranchPolicy,
    /// Accounts the branch designates for special purposes.
    pub references: BranchAccountReferences,
}

/// Branch settings repository.
#[derive(Debug, Clone)]
pub struct BranchSettingsRepository {
    db: DatabaseConnection,
}

impl BranchSettingsRepository {
    /// Creates a new branch settings repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the posting policy of a branch.
    ///
    /// A branch without a settings row uses the default policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_policy(
        &self,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> Result<BranchPolicy, StoreError> {
        find_policy(&self.db, organization_id, branch_id).await
    }

    /// Returns the singleton account references of a branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_references(
        &self,
        organization_id: OrganizationId,
        branch_id: BranchId,
    ) -> Result<BranchAccountReferences, StoreError> {
        find_references(&self.db, organization_id, branch_id).await
    }

    /// Inserts or replaces the settings of a branch.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced account does not exist or the write
    /// fails.
    pub async fn save(&self, settings: BranchSettings) -> Result<(), StoreError> {
        let refs = settings.references;
        let model = branch_settings::ActiveModel {
            organization_id: Set(settings.organization_id.into_inner()),
            branch_id: Set(settings.branch_id.into_inner()),
            maintain_balance: Set(settings.policy.maintain_balance),
            allow_negative_withdraw_balance: Set(settings.policy.allow_negative_withdraw_balance),
            cash_on_hand_account_id: Set(refs.cash_on_hand_account_id.map(|id| id.into_inner())),
            paid_up_share_capital_account_id: Set(refs
                .paid_up_share_capital_account_id
                .map(|id| id.into_inner())),
            shortage_account_id: Set(refs.shortage_account_id.map(|id| id.into_inner())),
            overage_account_id: Set(refs.overage_account_id.map(|id| id.into_inner())),
            updated_at: Set(Utc::now().into()),
        };

        branch_settings::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    branch_settings::Column::OrganizationId,
                    branch_settings::Column::BranchId,
                ])
                .update_columns([
                    branch_settings::Column::MaintainBalance,
                    branch_settings::Column::AllowNegativeWithdrawBalance,
                    branch_settings::Column::CashOnHandAccountId,
                    branch_settings::Column::PaidUpShareCapitalAccountId,
                    branch_settings::Column::ShortageAccountId,
                    branch_settings::Column::OverageAccountId,
                    branch_settings::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.db)
            .await?;

        info!(
            organization_id = %settings.organization_id,
            branch_id = %settings.branch_id,
            maintain_balance = settings.policy.maintain_balance,
            allow_negative_withdraw_balance = settings.policy.allow_negative_withdraw_balance,
            "Saved branch settings"
        );
        Ok(())
    }
}

async fn find_row<C>(
    conn: &C,
    organization_id: OrganizationId,
    branch_id: BranchId,
) -> Result<Option<branch_settings::Model>, StoreError>
where
    C: ConnectionTrait,
{
    Ok(
        branch_settings::Entity::find_by_id((organization_id.into_inner(), branch_id.into_inner()))
            .one(conn)
            .await?,
    )
}

pub(crate) async fn find_policy<C>(
    conn: &C,
    organization_id: OrganizationId,
    branch_id: BranchId,
) -> Result<BranchPolicy, StoreError>
where
    C: ConnectionTrait,
{
    Ok(find_row(conn, organization_id, branch_id)
        .await?
        .map(|row| row.policy())
        .unwrap_or_default())
}

pub(crate) async fn find_references<C>(
    conn: &C,
    organization_id: OrganizationId,
    branch_id: BranchId,
) -> Result<BranchAccountReferences, StoreError>
where
    C: ConnectionTrait,
{
    Ok(find_row(conn, organization_id, branch_id)
        .await?
        .map(|row| row.references())
        .unwrap_or_default())
}
