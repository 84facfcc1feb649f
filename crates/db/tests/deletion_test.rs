//! Integration tests for account deletion rules.

#![allow(clippy::uninlined_format_args)]

mod common;

use coopledger_core::account::{
    AccountAttributes, AccountType, BranchAccountReferences, DeletionBlocker, GeneralLedgerType,
};
use coopledger_core::ledger::{BranchPolicy, GeneralLedgerSource};
use coopledger_core::{ErrorKind, LedgerError};
use coopledger_db::BranchSettings;
use rust_decimal_macros::dec;

use common::setup;

fn blocker(err: &coopledger_db::StoreError) -> Option<DeletionBlocker> {
    match err.as_ledger() {
        Some(LedgerError::AccountInUse { blocker, .. }) => Some(*blocker),
        _ => None,
    }
}

#[tokio::test]
async fn test_delete_unreferenced_account() {
    let Some(fx) = setup().await else { return };
    let account = fx
        .account("Unused", AccountType::Other, Some(GeneralLedgerType::Expenses))
        .await;

    let event = fx
        .stores
        .accounts
        .delete_account(account.id, fx.org, fx.branch, fx.user)
        .await
        .unwrap();
    assert!(event.after.is_none());
    assert_eq!(event.before.unwrap().id, account.id);

    let found = fx
        .stores
        .accounts
        .find_account(account.id, fx.org, fx.branch)
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_account_with_entries_cannot_be_deleted() {
    let Some(fx) = setup().await else { return };
    let cash = fx
        .account("Cash on Hand", AccountType::Other, Some(GeneralLedgerType::Assets))
        .await;
    fx.stores
        .ledger
        .post_and_commit(&fx.draft(&cash, GeneralLedgerSource::Journal, dec!(1), dec!(0)))
        .await
        .unwrap();

    let err = fx
        .stores
        .accounts
        .delete_account(cash.id, fx.org, fx.branch, fx.user)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(blocker(&err), Some(DeletionBlocker::HasLedgerEntries(1)));
}

#[tokio::test]
async fn test_branch_singleton_account_cannot_be_deleted() {
    let Some(fx) = setup().await else { return };
    let cash = fx
        .account("Cash on Hand", AccountType::Other, Some(GeneralLedgerType::Assets))
        .await;
    fx.stores
        .branches
        .save(BranchSettings {
            organization_id: fx.org,
            branch_id: fx.branch,
            policy: BranchPolicy::default(),
            references: BranchAccountReferences {
                cash_on_hand_account_id: Some(cash.id),
                ..Default::default()
            },
        })
        .await
        .unwrap();

    let err = fx
        .stores
        .accounts
        .delete_account(cash.id, fx.org, fx.branch, fx.user)
        .await
        .unwrap_err();

    assert_eq!(blocker(&err), Some(DeletionBlocker::CashOnHand));
}

#[tokio::test]
async fn test_linked_loan_account_cannot_be_deleted() {
    let Some(fx) = setup().await else { return };
    let loan = fx
        .account("Salary Loan", AccountType::Loan, Some(GeneralLedgerType::Assets))
        .await;
    let mut fines = AccountAttributes::new(
        "Salary Loan Fines",
        AccountType::Fines,
        Some(GeneralLedgerType::Revenue),
    );
    fines.loan_account_id = Some(loan.id);
    fx.create(fines).await;

    let err = fx
        .stores
        .accounts
        .delete_account(loan.id, fx.org, fx.branch, fx.user)
        .await
        .unwrap_err();

    assert_eq!(blocker(&err), Some(DeletionBlocker::LinkedAccounts(1)));
}

#[tokio::test]
async fn test_delete_missing_account_is_not_found() {
    let Some(fx) = setup().await else { return };
    let err = fx
        .stores
        .accounts
        .delete_account(
            coopledger_shared::types::AccountId::new(),
            fx.org,
            fx.branch,
            fx.user,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}
