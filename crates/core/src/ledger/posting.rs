//! Running-balance computation and balance policy gate for one posting.
//!
//! The database layer locks the scope, loads the prior entry and the branch
//! policy, then calls [`compute_posting`]. Nothing here touches storage.

use rust_decimal::Decimal;

use super::balance::balance_change;
use super::types::{BranchPolicy, GeneralLedgerSource, LedgerEntryDraft, LedgerScope, MemberScope, PriorEntry};
use crate::account::Account;
use crate::error::{LedgerError, PolicyKind, PolicyViolation};

/// Result of computing one posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingComputation {
    /// Balance of the scope before the posting.
    pub prior_balance: Decimal,
    /// Signed change applied by the posting.
    pub balance_change: Decimal,
    /// Balance of the scope after the posting.
    pub new_balance: Decimal,
    /// Position the new entry takes in its scope.
    pub scope_sequence: i64,
}

/// Computes the new running balance and applies the branch balance policies.
///
/// Policies are only evaluated when the scope already has an entry and
/// either that entry or the one being posted is a withdrawal.
///
/// # Errors
///
/// Returns `LedgerError::BalancePolicyViolation` when a policy rejects the
/// posting.
pub fn compute_posting(
    account: &Account,
    scope: &LedgerScope,
    prior: Option<&PriorEntry>,
    draft: &LedgerEntryDraft,
    policy: BranchPolicy,
) -> Result<PostingComputation, LedgerError> {
    let prior_balance = prior.map_or(Decimal::ZERO, |p| p.balance);
    let change = balance_change(
        account.attributes.general_ledger_type,
        draft.debit,
        draft.credit,
    );
    let new_balance = prior_balance + change;

    if let Some(prior) = prior
        && (prior.source == GeneralLedgerSource::Withdraw
            || draft.source == GeneralLedgerSource::Withdraw)
    {
        check_policies(account, scope, prior_balance, new_balance, draft, policy)?;
    }

    Ok(PostingComputation {
        prior_balance,
        balance_change: change,
        new_balance,
        scope_sequence: prior.map_or(1, |p| p.scope_sequence + 1),
    })
}

fn check_policies(
    account: &Account,
    scope: &LedgerScope,
    prior_balance: Decimal,
    new_balance: Decimal,
    draft: &LedgerEntryDraft,
    policy: BranchPolicy,
) -> Result<(), LedgerError> {
    let min_amount = account.attributes.min_amount;

    let violated = if policy.maintain_balance && new_balance < min_amount {
        Some((PolicyKind::MaintainingBalance, min_amount))
    } else if !policy.allow_negative_withdraw_balance && new_balance < Decimal::ZERO {
        Some((PolicyKind::NegativeBalance, Decimal::ZERO))
    } else {
        None
    };

    match violated {
        Some((kind, threshold)) => Err(LedgerError::BalancePolicyViolation(Box::new(
            PolicyViolation {
                kind,
                account_id: account.id,
                member_profile_id: match scope.member {
                    MemberScope::Member(id) => Some(id),
                    MemberScope::AllMembers | MemberScope::NoMember => draft.member_profile_id,
                },
                prior_balance,
                debit: draft.debit,
                credit: draft.credit,
                new_balance,
                threshold,
            },
        ))),
        None => Ok(()),
    }
}
