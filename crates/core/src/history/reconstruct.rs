//! Point-in-time reconstruction over snapshot rows.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use coopledger_shared::types::{AccountId, CurrencyId};

use super::snapshot::{AccountSnapshot, SnapshotKind};
use crate::account::{Account, chart_order};

/// Optional attribute filters for [`reconstruct_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Keep only accounts linked to this loan account.
    pub loan_account_id: Option<AccountId>,
    /// Keep only accounts kept in this currency.
    pub currency_id: Option<CurrencyId>,
}

impl HistoryFilter {
    /// Returns true if `account` passes every filter that is set.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        let attributes = &account.attributes;
        self.loan_account_id
            .is_none_or(|id| attributes.loan_account_id == Some(id))
            && self
                .currency_id
                .is_none_or(|id| attributes.currency_id == Some(id))
    }
}

/// Reconstructs one account as it was at `as_of`.
///
/// `snapshots` are the account's history rows in any order and `current`
/// is the live account row, if it still exists. Returns `None` when no
/// snapshot was written at or before `as_of`.
pub fn reconstruct<'a>(
    snapshots: impl IntoIterator<Item = &'a AccountSnapshot>,
    current: Option<&Account>,
    as_of: DateTime<Utc>,
) -> Option<Account> {
    let snapshots: Vec<&AccountSnapshot> = snapshots.into_iter().collect();

    let latest_before = snapshots
        .iter()
        .filter(|s| s.created_at <= as_of)
        .max_by_key(|s| (s.created_at, s.updated_at))?;

    let superseding = snapshots
        .iter()
        .filter(|s| s.kind == SnapshotKind::BeforeUpdate && s.created_at > as_of)
        .min_by_key(|s| (s.created_at, s.updated_at));

    Some(match (superseding, current) {
        (Some(before_image), _) => before_image.to_account(),
        (None, Some(account)) => account.clone(),
        (None, None) => latest_before.to_account(),
    })
}

/// Reconstructs every account of a branch as it was at `as_of`.
///
/// Produces at most one account per id, filtered on the reconstructed
/// attributes and returned in chart order.
#[must_use]
pub fn reconstruct_all(
    snapshots: &[AccountSnapshot],
    current: &[Account],
    as_of: DateTime<Utc>,
    filter: HistoryFilter,
) -> Vec<Account> {
    let mut by_account: HashMap<AccountId, Vec<&AccountSnapshot>> = HashMap::new();
    for snapshot in snapshots {
        by_account.entry(snapshot.account_id).or_default().push(snapshot);
    }

    let live: HashMap<AccountId, &Account> = current.iter().map(|a| (a.id, a)).collect();

    let mut accounts: Vec<Account> = by_account
        .into_iter()
        .filter_map(|(account_id, rows)| {
            reconstruct(rows, live.get(&account_id).copied(), as_of)
        })
        .filter(|account| filter.matches(account))
        .collect();

    accounts.sort_by(chart_order);
    accounts
}
