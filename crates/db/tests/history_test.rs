//! Integration tests for account history.
//!
//! These tests verify that:
//! - Every update records the state that was live before it
//! - Reconstruction at a time returns the state live at that time
//! - Deleted accounts can still be reconstructed
//! - Snapshot capture on a missing account is a no-op

#![allow(clippy::uninlined_format_args)]

mod common;

use std::time::Duration;

use chrono::{DateTime, Utc};
use coopledger_core::account::{AccountType, GeneralLedgerType};
use coopledger_core::history::{HistoryFilter, SnapshotKind};
use coopledger_core::{ErrorKind, LedgerError};
use coopledger_shared::types::AccountId;
use rust_decimal_macros::dec;
use sea_orm::TransactionTrait;

use common::setup;

/// Returns a timestamp strictly between the previous and the next write.
async fn checkpoint() -> DateTime<Utc> {
    tokio::time::sleep(Duration::from_millis(5)).await;
    let at = Utc::now();
    tokio::time::sleep(Duration::from_millis(5)).await;
    at
}

#[tokio::test]
async fn test_reconstruct_returns_value_live_at_each_time() {
    let Some(fx) = setup().await else { return };
    let mut attributes = coopledger_core::account::AccountAttributes::new(
        "Salary Loan",
        AccountType::Loan,
        Some(GeneralLedgerType::Assets),
    );
    attributes.terms.interest_standard = dec!(2.0);
    let loan = fx.create(attributes).await;

    let t1 = checkpoint().await;
    fx.stores
        .accounts
        .update_account(loan.id, fx.org, fx.branch, fx.user, |a| {
            a.terms.interest_standard = dec!(4.0);
        })
        .await
        .unwrap();
    let t3 = checkpoint().await;

    let at_t1 = fx
        .stores
        .history
        .reconstruct(loan.id, fx.org, fx.branch, t1)
        .await
        .unwrap();
    let at_t3 = fx
        .stores
        .history
        .reconstruct(loan.id, fx.org, fx.branch, t3)
        .await
        .unwrap();

    assert_eq!(at_t1.attributes.terms.interest_standard, dec!(2.0));
    assert_eq!(at_t3.attributes.terms.interest_standard, dec!(4.0));
}

#[tokio::test]
async fn test_reconstruct_is_stable_while_updates_commit() {
    let Some(fx) = setup().await else { return };
    let mut attributes = coopledger_core::account::AccountAttributes::new(
        "Emergency Loan",
        AccountType::Loan,
        Some(GeneralLedgerType::Assets),
    );
    attributes.terms.interest_standard = dec!(2.0);
    let loan_id = fx.create(attributes).await.id;
    let as_of = checkpoint().await;
    let (org, branch, user) = (fx.org, fx.branch, fx.user);

    let writer = {
        let accounts = fx.stores.accounts.clone();
        tokio::spawn(async move {
            for step in 1..=20u32 {
                accounts
                    .update_account(loan_id, org, branch, user, |a| {
                        a.terms.interest_standard = dec!(2.0) + rust_decimal::Decimal::from(step);
                    })
                    .await
                    .unwrap();
            }
        })
    };

    let readers = (0..40).map(|_| {
        let history = fx.stores.history.clone();
        async move {
            history
                .reconstruct(loan_id, org, branch, as_of)
                .await
                .unwrap()
                .attributes
                .terms
                .interest_standard
        }
    });
    let rates = futures::future::join_all(readers).await;
    writer.await.unwrap();

    for rate in rates {
        assert_eq!(rate, dec!(2.0));
    }
}

#[tokio::test]
async fn test_updates_record_before_images() {
    let Some(fx) = setup().await else { return };
    let account = fx
        .account("Regular Savings", AccountType::Deposit, Some(GeneralLedgerType::Liabilities))
        .await;

    let (updated, event) = fx
        .stores
        .accounts
        .update_account(account.id, fx.org, fx.branch, fx.user, |a| {
            a.name = "Premium Savings".to_string();
        })
        .await
        .unwrap();
    assert_eq!(updated.attributes.name, "Premium Savings");
    assert_eq!(event.before.unwrap().attributes.name, "Regular Savings");

    let history = fx
        .stores
        .history
        .list_history(account.id, fx.org, fx.branch)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].kind, SnapshotKind::BeforeUpdate);
    assert_eq!(history[0].attributes.name, "Regular Savings");
    assert_eq!(history[0].created_at, updated.updated_at);
    assert_eq!(history[1].kind, SnapshotKind::Created);
}

#[tokio::test]
async fn test_reconstruct_before_creation_is_not_found() {
    let Some(fx) = setup().await else { return };
    let before = checkpoint().await;
    let account = fx
        .account("Regular Savings", AccountType::Deposit, Some(GeneralLedgerType::Liabilities))
        .await;

    let err = fx
        .stores
        .history
        .reconstruct(account.id, fx.org, fx.branch, before)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(err.as_ledger(), Some(LedgerError::HistoryNotFound { .. })));
}

#[tokio::test]
async fn test_deleted_account_is_reconstructed_from_history() {
    let Some(fx) = setup().await else { return };
    let account = fx
        .account("Old Fund", AccountType::Other, Some(GeneralLedgerType::Equity))
        .await;
    let alive = checkpoint().await;

    fx.stores
        .accounts
        .delete_account(account.id, fx.org, fx.branch, fx.user)
        .await
        .unwrap();

    let restored = fx
        .stores
        .history
        .reconstruct(account.id, fx.org, fx.branch, alive)
        .await
        .unwrap();
    assert_eq!(restored.attributes.name, "Old Fund");
}

#[tokio::test]
async fn test_record_before_update_on_missing_account_is_noop() {
    let Some(fx) = setup().await else { return };
    let missing = AccountId::new();

    let txn = fx.db.begin().await.unwrap();
    let recorded = fx
        .stores
        .history
        .record_before_update(&txn, missing, fx.org, fx.branch, fx.user)
        .await
        .unwrap();
    txn.commit().await.unwrap();

    assert!(recorded.is_none());
    let history = fx
        .stores
        .history
        .list_history(missing, fx.org, fx.branch)
        .await
        .unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_reconstruct_all_filters_on_reconstructed_state() {
    let Some(fx) = setup().await else { return };
    let parent = fx
        .account("Salary Loan", AccountType::Loan, Some(GeneralLedgerType::Assets))
        .await;
    let fines = fx
        .account("Salary Loan Fines", AccountType::Fines, Some(GeneralLedgerType::Revenue))
        .await;
    fx.account("Cash on Hand", AccountType::Other, Some(GeneralLedgerType::Assets))
        .await;

    let before_link = checkpoint().await;
    fx.stores
        .accounts
        .update_account(fines.id, fx.org, fx.branch, fx.user, |a| {
            a.loan_account_id = Some(parent.id);
        })
        .await
        .unwrap();
    let after_link = checkpoint().await;

    let linked = HistoryFilter {
        loan_account_id: Some(parent.id),
        currency_id: None,
    };
    let then = fx
        .stores
        .history
        .reconstruct_all_for_scope(fx.org, fx.branch, before_link, linked)
        .await
        .unwrap();
    let now = fx
        .stores
        .history
        .reconstruct_all_for_scope(fx.org, fx.branch, after_link, linked)
        .await
        .unwrap();
    let everything = fx
        .stores
        .history
        .reconstruct_all_for_scope(fx.org, fx.branch, after_link, HistoryFilter::default())
        .await
        .unwrap();

    assert!(then.is_empty());
    assert_eq!(now.len(), 1);
    assert_eq!(now[0].id, fines.id);
    assert_eq!(everything.len(), 3);
}

#[tokio::test]
async fn test_snapshot_rolls_back_with_caller_transaction() {
    let Some(fx) = setup().await else { return };
    let account = fx
        .account("Regular Savings", AccountType::Deposit, Some(GeneralLedgerType::Liabilities))
        .await;

    let txn = fx.db.begin().await.unwrap();
    fx.stores
        .history
        .record_before_update(&txn, account.id, fx.org, fx.branch, fx.user)
        .await
        .unwrap()
        .expect("account exists");
    txn.rollback().await.unwrap();

    let history = fx
        .stores
        .history
        .list_history(account.id, fx.org, fx.branch)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
}
