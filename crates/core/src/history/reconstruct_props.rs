//! Property-based tests for point-in-time reconstruction.

use chrono::{DateTime, Duration, TimeZone, Utc};
use coopledger_shared::types::{BranchId, OrganizationId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::reconstruct::reconstruct;
use super::snapshot::{AccountSnapshot, SnapshotKind};
use crate::account::{Account, AccountAttributes, AccountType, GeneralLedgerType};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// A creation followed by updates at strictly increasing minute offsets.
fn update_history() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((1i64..120, 0i64..10_000), 0..12).prop_map(|steps| {
        let mut minute = 0;
        let mut history = vec![(0, 0)];
        for (gap, rate) in steps {
            minute += gap;
            history.push((minute, rate));
        }
        history
    })
}

/// Builds the snapshot rows an account store would have written.
fn replay(history: &[(i64, i64)]) -> (Vec<AccountSnapshot>, Account) {
    let start = base_time();
    let actor = UserId::new();
    let mut attributes =
        AccountAttributes::new("Product", AccountType::Loan, Some(GeneralLedgerType::Assets));
    attributes.terms.interest_standard = Decimal::new(history[0].1, 2);
    let mut account = Account::new(OrganizationId::new(), BranchId::new(), attributes, actor, start);

    let mut rows = vec![AccountSnapshot::capture(
        &account,
        SnapshotKind::Created,
        actor,
        start,
    )];
    for &(minute, rate) in &history[1..] {
        let at = start + Duration::minutes(minute);
        rows.push(AccountSnapshot::capture(
            &account,
            SnapshotKind::BeforeUpdate,
            actor,
            at,
        ));
        account.attributes.terms.interest_standard = Decimal::new(rate, 2);
        account.updated_at = at;
    }
    (rows, account)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The reconstructed rate is the one most recently set at or before `as_of`.
    #[test]
    fn prop_reconstruct_returns_live_state(
        history in update_history(),
        probe in -10i64..1500,
    ) {
        let (rows, account) = replay(&history);
        let as_of = base_time() + Duration::minutes(probe);

        let expected = history
            .iter()
            .rev()
            .find(|(minute, _)| *minute <= probe)
            .map(|(_, rate)| Decimal::new(*rate, 2));

        let actual = reconstruct(&rows, Some(&account), as_of)
            .map(|a| a.attributes.terms.interest_standard);

        prop_assert_eq!(actual, expected);
    }
}
