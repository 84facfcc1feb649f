//! Chart of accounts ordering.
//!
//! Accounts are ordered by general-ledger group, then by a fractional
//! `index` key. Two operations maintain the key:
//!
//! - [`reindex`] renumbers a whole branch densely (1, 2, 3, ...) in chart
//!   order, across all groups.
//! - [`insertion_index`] picks a key for one new account between its
//!   alphabetical neighbours without touching any other account.
//!
//! Both are pure; persistence lives in the database crate.

use std::cmp::Ordering;

use coopledger_shared::types::AccountId;
use rust_decimal::Decimal;

use super::types::Account;

/// Key given to the first account of an empty group, and the gap left
/// between consecutive keys when appending.
pub const INDEX_STEP: Decimal = Decimal::TEN;

/// New index for one account produced by [`reindex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexAssignment {
    /// Account being renumbered.
    pub account_id: AccountId,
    /// Index before renumbering.
    pub previous: Decimal,
    /// Index after renumbering.
    pub index: Decimal,
}

impl IndexAssignment {
    /// Returns true if the account's index actually changes.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.previous != self.index
    }
}

/// Chart order: group rank, then index, then case-insensitive name.
#[must_use]
pub fn chart_order(a: &Account, b: &Account) -> Ordering {
    a.rank()
        .cmp(&b.rank())
        .then_with(|| a.attributes.index.cmp(&b.attributes.index))
        .then_with(|| {
            a.attributes
                .name
                .to_lowercase()
                .cmp(&b.attributes.name.to_lowercase())
        })
}

/// Computes a dense renumbering of `accounts`.
///
/// Accounts are sorted into chart order and each receives its position in
/// that order plus one; numbering does not restart per group. Assignments are returned in chart order, including
/// those whose index does not change.
#[must_use]
pub fn reindex(accounts: &[Account]) -> Vec<IndexAssignment> {
    let mut ordered: Vec<&Account> = accounts.iter().collect();
    ordered.sort_by(|a, b| chart_order(a, b));

    ordered
        .into_iter()
        .zip(1u32..)
        .map(|(account, position)| IndexAssignment {
            account_id: account.id,
            previous: account.attributes.index,
            index: Decimal::from(position),
        })
        .collect()
}

/// Computes the index for a new account named `name` among `siblings`.
///
/// `siblings` are the existing accounts of the same general-ledger group.
/// They are ordered by name (byte order) here, so the caller's ordering
/// does not matter. The result is deterministic for the same inputs.
#[must_use]
pub fn insertion_index(siblings: &[Account], name: &str) -> Decimal {
    let mut by_name: Vec<&Account> = siblings.iter().collect();
    by_name.sort_by(|a, b| a.attributes.name.cmp(&b.attributes.name));

    let count = Decimal::from(by_name.len());
    if by_name.len() <= 2 {
        return count * INDEX_STEP + INDEX_STEP;
    }

    let position = by_name.partition_point(|account| account.attributes.name.as_str() <= name);
    let two = Decimal::TWO;

    if position == 0 {
        // Halving only moves a key downwards while it is positive.
        let first = by_name[0].attributes.index;
        if first <= Decimal::ZERO {
            return first - INDEX_STEP;
        }
        let candidate = first / two;
        return if candidate == first {
            first - INDEX_STEP
        } else {
            candidate
        };
    }

    if position == by_name.len() {
        return by_name[position - 1].attributes.index + INDEX_STEP;
    }

    let prev = by_name[position - 1].attributes.index;
    let next = by_name[position].attributes.index;
    let candidate = (prev + next) / two;
    if candidate == prev || candidate == next {
        next + INDEX_STEP
    } else {
        candidate
    }
}
