//! `SeaORM` Entity for accounts table.

use coopledger_core::account::{
    Account, AccountAttributes, ComputationTerms, PostingSources,
};
use coopledger_shared::types::{AccountId, BranchId, CurrencyId, OrganizationId, UserId};
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::{parse_column, parse_optional_column};
use crate::error::StoreError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub account_type: String,
    pub general_ledger_type: Option<String>,
    #[sea_orm(column_type = "Decimal(None)")]
    pub sort_index: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub min_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub max_amount: Decimal,
    pub computation_type: String,
    pub lumpsum_computation_type: String,
    pub interest_standard_computation: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub interest_standard: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub interest_secured: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub fines_amort: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub fines_maturity: Decimal,
    pub fines_grace_period_amortization: i32,
    pub fines_grace_period_maturity: i32,
    pub additional_grace_period: i32,
    pub no_grace_period_daily: bool,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub yearly_subscription_fee: Decimal,
    pub cut_off_days: i32,
    pub cut_off_months: i32,
    pub compassion_fund: bool,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub compassion_fund_amount: Decimal,
    pub show_in_withdraw: bool,
    pub show_in_deposit: bool,
    pub show_in_journal: bool,
    pub show_in_payment: bool,
    pub show_in_adjustment: bool,
    pub show_in_journal_voucher: bool,
    pub show_in_check_voucher: bool,
    pub is_internal: bool,
    pub cash_on_hand: bool,
    pub paid_up_share_capital: bool,
    pub cash_and_cash_equivalence: bool,
    pub currency_id: Option<Uuid>,
    pub loan_account_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub created_by: Uuid,
    pub updated_at: DateTimeWithTimeZone,
    pub updated_by: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::general_ledger_entries::Entity")]
    GeneralLedgerEntries,
}

impl Related<super::general_ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GeneralLedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Account {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = model.id;
        let terms = ComputationTerms {
            computation_type: parse_column("accounts", id, &model.computation_type)?,
            lumpsum_computation_type: parse_column(
                "accounts",
                id,
                &model.lumpsum_computation_type,
            )?,
            interest_standard_computation: parse_column(
                "accounts",
                id,
                &model.interest_standard_computation,
            )?,
            interest_standard: model.interest_standard,
            interest_secured: model.interest_secured,
            fines_amort: model.fines_amort,
            fines_maturity: model.fines_maturity,
            fines_grace_period_amortization: model.fines_grace_period_amortization,
            fines_grace_period_maturity: model.fines_grace_period_maturity,
            additional_grace_period: model.additional_grace_period,
            no_grace_period_daily: model.no_grace_period_daily,
            yearly_subscription_fee: model.yearly_subscription_fee,
            cut_off_days: model.cut_off_days,
            cut_off_months: model.cut_off_months,
            compassion_fund: model.compassion_fund,
            compassion_fund_amount: model.compassion_fund_amount,
        };

        let attributes = AccountAttributes {
            account_type: parse_column("accounts", id, &model.account_type)?,
            general_ledger_type: parse_optional_column(
                "accounts",
                id,
                model.general_ledger_type.as_deref(),
            )?,
            name: model.name,
            description: model.description,
            index: model.sort_index,
            min_amount: model.min_amount,
            max_amount: model.max_amount,
            terms,
            posting_sources: PostingSources {
                withdraw: model.show_in_withdraw,
                deposit: model.show_in_deposit,
                journal: model.show_in_journal,
                payment: model.show_in_payment,
                adjustment: model.show_in_adjustment,
                journal_voucher: model.show_in_journal_voucher,
                check_voucher: model.show_in_check_voucher,
            },
            is_internal: model.is_internal,
            cash_on_hand: model.cash_on_hand,
            paid_up_share_capital: model.paid_up_share_capital,
            cash_and_cash_equivalence: model.cash_and_cash_equivalence,
            currency_id: model.currency_id.map(CurrencyId::from_uuid),
            loan_account_id: model.loan_account_id.map(AccountId::from_uuid),
        };

        Ok(Self {
            id: AccountId::from_uuid(id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            branch_id: BranchId::from_uuid(model.branch_id),
            attributes,
            created_at: model.created_at.to_utc(),
            created_by: UserId::from_uuid(model.created_by),
            updated_at: model.updated_at.to_utc(),
            updated_by: UserId::from_uuid(model.updated_by),
        })
    }
}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        let a = &account.attributes;
        let terms = &a.terms;
        let sources = &a.posting_sources;
        Self {
            id: Set(account.id.into_inner()),
            organization_id: Set(account.organization_id.into_inner()),
            branch_id: Set(account.branch_id.into_inner()),
            name: Set(a.name.clone()),
            description: Set(a.description.clone()),
            account_type: Set(a.account_type.as_str().to_string()),
            general_ledger_type: Set(a.general_ledger_type.map(|gl| gl.as_str().to_string())),
            sort_index: Set(a.index),
            min_amount: Set(a.min_amount),
            max_amount: Set(a.max_amount),
            computation_type: Set(terms.computation_type.as_str().to_string()),
            lumpsum_computation_type: Set(terms.lumpsum_computation_type.as_str().to_string()),
            interest_standard_computation: Set(terms
                .interest_standard_computation
                .as_str()
                .to_string()),
            interest_standard: Set(terms.interest_standard),
            interest_secured: Set(terms.interest_secured),
            fines_amort: Set(terms.fines_amort),
            fines_maturity: Set(terms.fines_maturity),
            fines_grace_period_amortization: Set(terms.fines_grace_period_amortization),
            fines_grace_period_maturity: Set(terms.fines_grace_period_maturity),
            additional_grace_period: Set(terms.additional_grace_period),
            no_grace_period_daily: Set(terms.no_grace_period_daily),
            yearly_subscription_fee: Set(terms.yearly_subscription_fee),
            cut_off_days: Set(terms.cut_off_days),
            cut_off_months: Set(terms.cut_off_months),
            compassion_fund: Set(terms.compassion_fund),
            compassion_fund_amount: Set(terms.compassion_fund_amount),
            show_in_withdraw: Set(sources.withdraw),
            show_in_deposit: Set(sources.deposit),
            show_in_journal: Set(sources.journal),
            show_in_payment: Set(sources.payment),
            show_in_adjustment: Set(sources.adjustment),
            show_in_journal_voucher: Set(sources.journal_voucher),
            show_in_check_voucher: Set(sources.check_voucher),
            is_internal: Set(a.is_internal),
            cash_on_hand: Set(a.cash_on_hand),
            paid_up_share_capital: Set(a.paid_up_share_capital),
            cash_and_cash_equivalence: Set(a.cash_and_cash_equivalence),
            currency_id: Set(a.currency_id.map(CurrencyId::into_inner)),
            loan_account_id: Set(a.loan_account_id.map(AccountId::into_inner)),
            created_at: Set(account.created_at.into()),
            created_by: Set(account.created_by.into_inner()),
            updated_at: Set(account.updated_at.into()),
            updated_by: Set(account.updated_by.into_inner()),
        }
    }
}
