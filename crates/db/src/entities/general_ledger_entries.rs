//! `SeaORM` Entity for general_ledger_entries table.

use coopledger_core::ledger::GeneralLedgerEntry;
use coopledger_shared::types::{
    AccountId, BranchId, LedgerEntryId, MemberProfileId, OrganizationId, PaymentTypeId,
    TransactionId, UserId,
};
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::parse_column;
use crate::error::StoreError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "general_ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub branch_id: Uuid,
    pub account_id: Uuid,
    pub member_profile_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub credit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub balance: Decimal,
    pub scope_sequence: i64,
    pub source: String,
    pub entry_date: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub created_by: Uuid,
    pub payment_type_id: Option<Uuid>,
    pub transaction_id: Option<Uuid>,
    pub reference_number: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
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

impl TryFrom<Model> for GeneralLedgerEntry {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LedgerEntryId::from_uuid(model.id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            branch_id: BranchId::from_uuid(model.branch_id),
            account_id: AccountId::from_uuid(model.account_id),
            member_profile_id: model.member_profile_id.map(MemberProfileId::from_uuid),
            debit: model.debit,
            credit: model.credit,
            balance: model.balance,
            scope_sequence: model.scope_sequence,
            source: parse_column("general_ledger_entries", model.id, &model.source)?,
            entry_date: model.entry_date.to_utc(),
            created_at: model.created_at.to_utc(),
            created_by: UserId::from_uuid(model.created_by),
            payment_type_id: model.payment_type_id.map(PaymentTypeId::from_uuid),
            transaction_id: model.transaction_id.map(TransactionId::from_uuid),
            reference_number: model.reference_number,
            description: model.description,
        })
    }
}

impl From<&GeneralLedgerEntry> for ActiveModel {
    fn from(entry: &GeneralLedgerEntry) -> Self {
        Self {
            id: Set(entry.id.into_inner()),
            organization_id: Set(entry.organization_id.into_inner()),
            branch_id: Set(entry.branch_id.into_inner()),
            account_id: Set(entry.account_id.into_inner()),
            member_profile_id: Set(entry.member_profile_id.map(MemberProfileId::into_inner)),
            debit: Set(entry.debit),
            credit: Set(entry.credit),
            balance: Set(entry.balance),
            scope_sequence: Set(entry.scope_sequence),
            source: Set(entry.source.as_str().to_string()),
            entry_date: Set(entry.entry_date.into()),
            created_at: Set(entry.created_at.into()),
            created_by: Set(entry.created_by.into_inner()),
            payment_type_id: Set(entry.payment_type_id.map(PaymentTypeId::into_inner)),
            transaction_id: Set(entry.transaction_id.map(TransactionId::into_inner)),
            reference_number: Set(entry.reference_number.clone()),
            description: Set(entry.description.clone()),
        }
    }
}
