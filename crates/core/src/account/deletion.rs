//! Rules deciding whether an account may be deleted.

use coopledger_shared::types::AccountId;

use crate::error::LedgerError;

/// Reason an account cannot be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionBlocker {
    /// Ledger entries reference the account.
    HasLedgerEntries(u64),
    /// The account is the branch cash-on-hand account.
    CashOnHand,
    /// The account is the branch paid-up share capital account.
    PaidUpShareCapital,
    /// The account is the branch cash shortage account.
    ShortageAccount,
    /// The account is the branch cash overage account.
    OverageAccount,
    /// Other accounts link to it as their loan account.
    LinkedAccounts(u64),
}

impl std::fmt::Display for DeletionBlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HasLedgerEntries(n) => write!(f, "{n} ledger entries reference it"),
            Self::CashOnHand => write!(f, "it is the branch cash on hand account"),
            Self::PaidUpShareCapital => {
                write!(f, "it is the branch paid up share capital account")
            }
            Self::ShortageAccount => write!(f, "it is the branch shortage account"),
            Self::OverageAccount => write!(f, "it is the branch overage account"),
            Self::LinkedAccounts(n) => write!(f, "{n} accounts are linked to it"),
        }
    }
}

/// Branch-level singleton accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BranchAccountReferences {
    /// Cash on hand.
    pub cash_on_hand_account_id: Option<AccountId>,
    /// Paid-up share capital.
    pub paid_up_share_capital_account_id: Option<AccountId>,
    /// Cash shortage.
    pub shortage_account_id: Option<AccountId>,
    /// Cash overage.
    pub overage_account_id: Option<AccountId>,
}

/// Everything that may still point at an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountReferences {
    /// Number of ledger entries posted to the account.
    pub ledger_entries: u64,
    /// Branch singleton configuration.
    pub branch: BranchAccountReferences,
    /// Number of accounts whose loan account is this one.
    pub linked_accounts: u64,
}

/// Checks that nothing references `account_id`.
///
/// # Errors
///
/// Returns `LedgerError::AccountInUse` naming the first reference found.
pub fn check_deletable(
    account_id: AccountId,
    references: &AccountReferences,
) -> Result<(), LedgerError> {
    let branch = &references.branch;
    let blocker = if references.ledger_entries > 0 {
        Some(DeletionBlocker::HasLedgerEntries(references.ledger_entries))
    } else if branch.cash_on_hand_account_id == Some(account_id) {
        Some(DeletionBlocker::CashOnHand)
    } else if branch.paid_up_share_capital_account_id == Some(account_id) {
        Some(DeletionBlocker::PaidUpShareCapital)
    } else if branch.shortage_account_id == Some(account_id) {
        Some(DeletionBlocker::ShortageAccount)
    } else if branch.overage_account_id == Some(account_id) {
        Some(DeletionBlocker::OverageAccount)
    } else if references.linked_accounts > 0 {
        Some(DeletionBlocker::LinkedAccounts(references.linked_accounts))
    } else {
        None
    };

    match blocker {
        Some(blocker) => Err(LedgerError::AccountInUse {
            account_id,
            blocker,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocker_of(result: Result<(), LedgerError>) -> DeletionBlocker {
        match result {
            Err(LedgerError::AccountInUse { blocker, .. }) => blocker,
            other => panic!("expected AccountInUse, got {other:?}"),
        }
    }

    #[test]
    fn test_unreferenced_account_is_deletable() {
        assert!(check_deletable(AccountId::new(), &AccountReferences::default()).is_ok());
    }

    #[test]
    fn test_ledger_entries_block_first() {
        let id = AccountId::new();
        let refs = AccountReferences {
            ledger_entries: 3,
            branch: BranchAccountReferences {
                cash_on_hand_account_id: Some(id),
                ..Default::default()
            },
            linked_accounts: 1,
        };
        assert_eq!(
            blocker_of(check_deletable(id, &refs)),
            DeletionBlocker::HasLedgerEntries(3)
        );
    }

    #[test]
    fn test_branch_singletons_block() {
        let id = AccountId::new();
        let cases = [
            (
                BranchAccountReferences {
                    cash_on_hand_account_id: Some(id),
                    ..Default::default()
                },
                DeletionBlocker::CashOnHand,
            ),
            (
                BranchAccountReferences {
                    paid_up_share_capital_account_id: Some(id),
                    ..Default::default()
                },
                DeletionBlocker::PaidUpShareCapital,
            ),
            (
                BranchAccountReferences {
                    shortage_account_id: Some(id),
                    ..Default::default()
                },
                DeletionBlocker::ShortageAccount,
            ),
            (
                BranchAccountReferences {
                    overage_account_id: Some(id),
                    ..Default::default()
                },
                DeletionBlocker::OverageAccount,
            ),
        ];

        for (branch, expected) in cases {
            let refs = AccountReferences {
                branch,
                ..Default::default()
            };
            assert_eq!(blocker_of(check_deletable(id, &refs)), expected);
        }
    }

    #[test]
    fn test_other_accounts_singletons_do_not_block() {
        let refs = AccountReferences {
            branch: BranchAccountReferences {
                cash_on_hand_account_id: Some(AccountId::new()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(check_deletable(AccountId::new(), &refs).is_ok());
    }

    #[test]
    fn test_linked_accounts_block() {
        let refs = AccountReferences {
            linked_accounts: 2,
            ..Default::default()
        };
        assert_eq!(
            blocker_of(check_deletable(AccountId::new(), &refs)),
            DeletionBlocker::LinkedAccounts(2)
        );
    }
}
