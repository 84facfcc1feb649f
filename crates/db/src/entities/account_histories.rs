//! `SeaORM` Entity for account_histories table.
//!
//! The full attribute set is stored as JSONB; `loan_account_id` and
//! `currency_id` are duplicated into columns for filtering.

use coopledger_core::account::AccountAttributes;
use coopledger_core::history::AccountSnapshot;
use coopledger_shared::types::{AccountHistoryId, AccountId, BranchId, OrganizationId, UserId};
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::parse_column;
use crate::error::StoreError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "account_histories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub organization_id: Uuid,
    pub branch_id: Uuid,
    pub kind: String,
    pub loan_account_id: Option<Uuid>,
    pub currency_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary")]
    pub attributes: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_by: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for AccountSnapshot {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let attributes: AccountAttributes =
            serde_json::from_value(model.attributes).map_err(|e| StoreError::Corrupt {
                table: "account_histories",
                id: model.id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id: AccountHistoryId::from_uuid(model.id),
            account_id: AccountId::from_uuid(model.account_id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            branch_id: BranchId::from_uuid(model.branch_id),
            kind: parse_column("account_histories", model.id, &model.kind)?,
            attributes,
            created_at: model.created_at.to_utc(),
            updated_at: model.updated_at.to_utc(),
            created_by: UserId::from_uuid(model.created_by),
        })
    }
}

impl TryFrom<&AccountSnapshot> for ActiveModel {
    type Error = StoreError;

    fn try_from(snapshot: &AccountSnapshot) -> Result<Self, Self::Error> {
        let attributes =
            serde_json::to_value(&snapshot.attributes).map_err(|e| StoreError::Corrupt {
                table: "account_histories",
                id: snapshot.id.into_inner(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            id: Set(snapshot.id.into_inner()),
            account_id: Set(snapshot.account_id.into_inner()),
            organization_id: Set(snapshot.organization_id.into_inner()),
            branch_id: Set(snapshot.branch_id.into_inner()),
            kind: Set(snapshot.kind.as_str().to_string()),
            loan_account_id: Set(snapshot.attributes.loan_account_id.map(AccountId::into_inner)),
            currency_id: Set(snapshot.attributes.currency_id.map(|c| c.into_inner())),
            attributes: Set(attributes),
            created_at: Set(snapshot.created_at.into()),
            updated_at: Set(snapshot.updated_at.into()),
            created_by: Set(snapshot.created_by.into_inner()),
        })
    }
}
