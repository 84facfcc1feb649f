//! `SeaORM` Entity for member_accounting_ledgers table.

use coopledger_core::ledger::MemberLedgerSummary;
use coopledger_shared::types::{
    AccountId, BranchId, MemberLedgerId, MemberProfileId, OrganizationId, UserId,
};
use sea_orm::entity::prelude::*;
use sea_orm::Set;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "member_accounting_ledgers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub branch_id: Uuid,
    pub member_profile_id: Uuid,
    pub account_id: Uuid,
    pub count: i64,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub balance: Decimal,
    pub last_pay: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub created_by: Uuid,
    pub updated_at: DateTimeWithTimeZone,
    pub updated_by: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MemberLedgerSummary {
    fn from(model: Model) -> Self {
        Self {
            id: MemberLedgerId::from_uuid(model.id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            branch_id: BranchId::from_uuid(model.branch_id),
            member_profile_id: MemberProfileId::from_uuid(model.member_profile_id),
            account_id: AccountId::from_uuid(model.account_id),
            count: model.count,
            balance: model.balance,
            last_pay: model.last_pay.map(|t| t.to_utc()),
            created_at: model.created_at.to_utc(),
            created_by: UserId::from_uuid(model.created_by),
            updated_at: model.updated_at.to_utc(),
            updated_by: UserId::from_uuid(model.updated_by),
        }
    }
}

impl From<&MemberLedgerSummary> for ActiveModel {
    fn from(summary: &MemberLedgerSummary) -> Self {
        Self {
            id: Set(summary.id.into_inner()),
            organization_id: Set(summary.organization_id.into_inner()),
            branch_id: Set(summary.branch_id.into_inner()),
            member_profile_id: Set(summary.member_profile_id.into_inner()),
            account_id: Set(summary.account_id.into_inner()),
            count: Set(summary.count),
            balance: Set(summary.balance),
            last_pay: Set(summary.last_pay.map(Into::into)),
            created_at: Set(summary.created_at.into()),
            created_by: Set(summary.created_by.into_inner()),
            updated_at: Set(summary.updated_at.into()),
            updated_by: Set(summary.updated_by.into_inner()),
        }
    }
}
