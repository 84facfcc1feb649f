//! Property-based tests for running balances, policies and vouchers.

use chrono::Utc;
use coopledger_shared::types::{BranchId, MemberProfileId, OrganizationId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::balance_change;
use super::posting::compute_posting;
use super::types::{BranchPolicy, GeneralLedgerSource, LedgerEntryDraft, LedgerScope, PriorEntry};
use super::voucher::{VoucherAmounts, validate_balance};
use crate::account::{Account, AccountAttributes, AccountType, GeneralLedgerType};
use crate::error::{LedgerError, PolicyKind};

/// Amounts from 0.00 to 100,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

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

fn non_withdraw_source() -> impl Strategy<Value = GeneralLedgerSource> {
    prop_oneof![
        Just(GeneralLedgerSource::Deposit),
        Just(GeneralLedgerSource::Payment),
        Just(GeneralLedgerSource::JournalVoucher),
        Just(GeneralLedgerSource::Adjustment),
        Just(GeneralLedgerSource::Loan),
    ]
}

fn account(gl: Option<GeneralLedgerType>, min_amount: Decimal) -> Account {
    let mut attributes = AccountAttributes::new("Share Capital", AccountType::Deposit, gl);
    attributes.min_amount = min_amount;
    Account::new(
        OrganizationId::new(),
        BranchId::new(),
        attributes,
        UserId::new(),
        Utc::now(),
    )
}

fn draft(
    account: &Account,
    member: MemberProfileId,
    source: GeneralLedgerSource,
    debit: Decimal,
    credit: Decimal,
) -> LedgerEntryDraft {
    LedgerEntryDraft::new(account, source, debit, credit, UserId::new(), Utc::now()).for_member(member)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Each entry's balance is the previous balance plus its signed change,
    /// so the final balance is the sum of all changes.
    #[test]
    fn prop_running_balance_is_sum_of_changes(
        gl in gl_strategy(),
        postings in prop::collection::vec((non_withdraw_source(), amount(), amount()), 1..40),
    ) {
        let account = account(gl, Decimal::ZERO);
        let member = MemberProfileId::new();
        let scope = LedgerScope::for_posting(
            &account,
            account.organization_id,
            account.branch_id,
            Some(member),
        );

        let mut prior: Option<PriorEntry> = None;
        let mut expected_total = Decimal::ZERO;

        for (index, (source, debit, credit)) in postings.into_iter().enumerate() {
            let d = draft(&account, member, source, debit, credit);
            let computed = compute_posting(&account, &scope, prior.as_ref(), &d, BranchPolicy::default())
                .unwrap();

            let previous = prior.map_or(Decimal::ZERO, |p| p.balance);
            prop_assert_eq!(computed.new_balance, previous + balance_change(gl, debit, credit));
            prop_assert_eq!(computed.scope_sequence, i64::try_from(index).unwrap() + 1);

            expected_total += balance_change(gl, debit, credit);
            prior = Some(PriorEntry {
                balance: computed.new_balance,
                source,
                scope_sequence: computed.scope_sequence,
            });
        }

        prop_assert_eq!(prior.map(|p| p.balance), Some(expected_total));
    }

    /// A gated withdrawal either keeps the balance at or above the minimum
    /// or is rejected with the maintaining balance policy.
    #[test]
    fn prop_maintaining_balance_gate(
        prior_balance in amount(),
        min_amount in amount(),
        withdrawal in amount(),
    ) {
        let account = account(Some(GeneralLedgerType::Liabilities), min_amount);
        let member = MemberProfileId::new();
        let d = draft(&account, member, GeneralLedgerSource::Withdraw, withdrawal, Decimal::ZERO);
        let scope = LedgerScope::for_posting(&account, d.organization_id, d.branch_id, Some(member));
        let prior = PriorEntry {
            balance: prior_balance,
            source: GeneralLedgerSource::Deposit,
            scope_sequence: 1,
        };
        let policy = BranchPolicy {
            maintain_balance: true,
            allow_negative_withdraw_balance: true,
        };

        match compute_posting(&account, &scope, Some(&prior), &d, policy) {
            Ok(result) => prop_assert!(result.new_balance >= min_amount),
            Err(LedgerError::BalancePolicyViolation(violation)) => {
                prop_assert_eq!(violation.kind, PolicyKind::MaintainingBalance);
                prop_assert!(prior_balance - withdrawal < min_amount);
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    /// A voucher validates exactly when its debit and credit sums match.
    #[test]
    fn prop_voucher_balance(
        lines in prop::collection::vec((amount(), amount()), 0..20),
    ) {
        let voucher: Vec<VoucherAmounts> = lines
            .iter()
            .map(|&(debit, credit)| VoucherAmounts { debit, credit })
            .collect();
        let debit: Decimal = lines.iter().map(|(d, _)| *d).sum();
        let credit: Decimal = lines.iter().map(|(_, c)| *c).sum();

        match validate_balance(&voucher) {
            Ok(totals) => {
                prop_assert_eq!(debit, credit);
                prop_assert_eq!(totals.debit, debit);
            }
            Err(LedgerError::Unbalanced { debit: d, credit: c }) => {
                prop_assert_ne!(debit, credit);
                prop_assert_eq!(d, debit);
                prop_assert_eq!(c, credit);
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }
}
