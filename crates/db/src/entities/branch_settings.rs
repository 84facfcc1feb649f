//! `SeaORM` Entity for branch_settings table.

use coopledger_core::account::BranchAccountReferences;
use coopledger_core::ledger::BranchPolicy;
use coopledger_shared::types::AccountId;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "branch_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub organization_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub branch_id: Uuid,
    pub maintain_balance: bool,
    pub allow_negative_withdraw_balance: bool,
    pub cash_on_hand_account_id: Option<Uuid>,
    pub paid_up_share_capital_account_id: Option<Uuid>,
    pub shortage_account_id: Option<Uuid>,
    pub overage_account_id: Option<Uuid>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Posting policy flags.
    #[must_use]
    pub const fn policy(&self) -> BranchPolicy {
        BranchPolicy {
            maintain_balance: self.maintain_balance,
            allow_negative_withdraw_balance: self.allow_negative_withdraw_balance,
        }
    }

    /// Singleton account references.
    #[must_use]
    pub fn references(&self) -> BranchAccountReferences {
        BranchAccountReferences {
            cash_on_hand_account_id: self.cash_on_hand_account_id.map(AccountId::from_uuid),
            paid_up_share_capital_account_id: self
                .paid_up_share_capital_account_id
                .map(AccountId::from_uuid),
            shortage_account_id: self.shortage_account_id.map(AccountId::from_uuid),
            overage_account_id: self.overage_account_id.map(AccountId::from_uuid),
        }
    }
}
