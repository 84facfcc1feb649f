//! Property-based tests for chart ordering.

use std::collections::BTreeSet;

use chrono::Utc;
use coopledger_shared::types::{BranchId, OrganizationId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::index::{insertion_index, reindex};
use super::types::{Account, AccountAttributes, AccountType, GeneralLedgerType};

fn gl_strategy() -> impl Strategy<Value = Option<GeneralLedgerType>> {
    prop_oneof![
        Just(Some(GeneralLedgerType::Assets)),
        Just(Some(GeneralLedgerType::Liabilities)),
        Just(Some(GeneralLedgerType::Equity)),
        Just(Some(GeneralLedgerType::Revenue)),
        Just(Some(GeneralLedgerType::Expenses)),
        Just(None),
    ]
}

fn make_account(name: String, gl: Option<GeneralLedgerType>, index: Decimal) -> Account {
    let mut attributes = AccountAttributes::new(name, AccountType::Deposit, gl);
    attributes.index = index;
    Account::new(
        OrganizationId::new(),
        BranchId::new(),
        attributes,
        UserId::new(),
        Utc::now(),
    )
}

fn accounts_strategy() -> impl Strategy<Value = Vec<Account>> {
    prop::collection::vec(
        ("[a-zA-Z]{1,8}", gl_strategy(), 0i64..50),
        0..30,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(name, gl, index)| make_account(name, gl, Decimal::from(index)))
            .collect()
    })
}

/// Siblings with distinct names whose keys increase in name order. Keys may
/// start at or below zero.
fn ordered_siblings_strategy() -> impl Strategy<Value = Vec<Account>> {
    (
        prop::collection::btree_set("[a-z]{1,6}", 3..20),
        prop::collection::vec(1i64..1000, 20),
        -1000i64..100,
    )
        .prop_map(|(names, gaps, start): (BTreeSet<String>, Vec<i64>, i64)| {
            let mut key = Decimal::from(start);
            names
                .into_iter()
                .zip(gaps)
                .map(|(name, gap)| {
                    key += Decimal::from(gap);
                    make_account(name, Some(GeneralLedgerType::Assets), key)
                })
                .collect()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The chart is renumbered 1..=n in order, groups ascending.
    #[test]
    fn prop_reindex_is_dense_across_chart(accounts in accounts_strategy()) {
        let assignments = reindex(&accounts);
        prop_assert_eq!(assignments.len(), accounts.len());

        let rank_of = |id| {
            accounts.iter().find(|a| a.id == id).map(Account::rank).unwrap()
        };

        let mut last_rank = None;
        for (position, assignment) in (1i64..).zip(&assignments) {
            prop_assert_eq!(assignment.index, Decimal::from(position));
            let rank = rank_of(assignment.account_id);
            prop_assert!(last_rank.is_none_or(|r| r <= rank));
            last_rank = Some(rank);
        }
    }

    /// Reindexing an already reindexed chart changes nothing.
    #[test]
    fn prop_reindex_is_stable(accounts in accounts_strategy()) {
        let mut renumbered = accounts.clone();
        for assignment in reindex(&accounts) {
            let account = renumbered.iter_mut().find(|a| a.id == assignment.account_id).unwrap();
            account.attributes.index = assignment.index;
        }
        prop_assert!(reindex(&renumbered).iter().all(|a| !a.is_changed()));
    }

    /// The new key sorts the account between its alphabetical neighbours.
    #[test]
    fn prop_insertion_index_lands_between_neighbours(
        siblings in ordered_siblings_strategy(),
        name in "[a-z]{1,6}",
    ) {
        let index = insertion_index(&siblings, &name);
        let before = siblings.iter().filter(|a| a.attributes.name.as_str() <= name.as_str());
        let after = siblings.iter().filter(|a| a.attributes.name.as_str() > name.as_str());

        for account in before {
            prop_assert!(account.attributes.index < index);
        }
        for account in after {
            prop_assert!(account.attributes.index > index);
        }
    }
}
