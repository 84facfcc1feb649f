//! Ledger domain types.

use chrono::{DateTime, Utc};
use coopledger_shared::types::{
    AccountId, BranchId, LedgerEntryId, MemberProfileId, OrganizationId, PaymentTypeId,
    TransactionId, UserId, is_magnitude, to_storage,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::error::LedgerError;

/// Business event that produced a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneralLedgerSource {
    /// Cash withdrawal.
    Withdraw,
    /// Cash deposit.
    Deposit,
    /// Journal entry.
    Journal,
    /// Payment received.
    Payment,
    /// Adjustment entry.
    Adjustment,
    /// Journal voucher.
    JournalVoucher,
    /// Check voucher.
    CheckVoucher,
    /// Loan release.
    Loan,
    /// Savings interest run.
    SavingsInterest,
    /// Mutual aid contribution.
    MutualContribution,
    /// Cash disbursement.
    Disbursement,
    /// Teller blotter.
    Blotter,
}

impl GeneralLedgerSource {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Withdraw => "withdraw",
            Self::Deposit => "deposit",
            Self::Journal => "journal",
            Self::Payment => "payment",
            Self::Adjustment => "adjustment",
            Self::JournalVoucher => "journal voucher",
            Self::CheckVoucher => "check voucher",
            Self::Loan => "loan",
            Self::SavingsInterest => "savings interest",
            Self::MutualContribution => "mutual contribution",
            Self::Disbursement => "disbursement",
            Self::Blotter => "blotter",
        }
    }

    /// Daily collection report category, if the source is collected at all.
    #[must_use]
    pub const fn collection_category(self) -> Option<CollectionCategory> {
        match self {
            Self::Payment | Self::Deposit => Some(CollectionCategory::Booking),
            Self::Withdraw | Self::CheckVoucher | Self::Loan => {
                Some(CollectionCategory::Disbursement)
            }
            Self::JournalVoucher | Self::Adjustment => Some(CollectionCategory::Journal),
            _ => None,
        }
    }
}

impl std::fmt::Display for GeneralLedgerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GeneralLedgerSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "withdraw" => Ok(Self::Withdraw),
            "deposit" => Ok(Self::Deposit),
            "journal" => Ok(Self::Journal),
            "payment" => Ok(Self::Payment),
            "adjustment" => Ok(Self::Adjustment),
            "journal voucher" => Ok(Self::JournalVoucher),
            "check voucher" => Ok(Self::CheckVoucher),
            "loan" => Ok(Self::Loan),
            "savings interest" => Ok(Self::SavingsInterest),
            "mutual contribution" => Ok(Self::MutualContribution),
            "disbursement" => Ok(Self::Disbursement),
            "blotter" => Ok(Self::Blotter),
            _ => Err(format!("Unknown general ledger source: {s}")),
        }
    }
}

/// Grouping of sources in the daily collection report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionCategory {
    /// Payments and deposits.
    Booking,
    /// Withdrawals, check vouchers and loan releases.
    Disbursement,
    /// Journal vouchers and adjustments.
    Journal,
}

impl CollectionCategory {
    /// Sources belonging to this category.
    #[must_use]
    pub const fn sources(self) -> &'static [GeneralLedgerSource] {
        match self {
            Self::Booking => &[GeneralLedgerSource::Payment, GeneralLedgerSource::Deposit],
            Self::Disbursement => &[
                GeneralLedgerSource::Withdraw,
                GeneralLedgerSource::CheckVoucher,
                GeneralLedgerSource::Loan,
            ],
            Self::Journal => &[
                GeneralLedgerSource::JournalVoucher,
                GeneralLedgerSource::Adjustment,
            ],
        }
    }
}

/// An entry to be posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntryDraft {
    /// Organization the entry is booked in.
    pub organization_id: OrganizationId,
    /// Branch the entry is booked in.
    pub branch_id: BranchId,
    /// Target account.
    pub account_id: AccountId,
    /// Member sub-ledger, if any.
    pub member_profile_id: Option<MemberProfileId>,
    /// Non-negative debit magnitude.
    pub debit: Decimal,
    /// Non-negative credit magnitude.
    pub credit: Decimal,
    /// Originating business event.
    pub source: GeneralLedgerSource,
    /// Business date of the entry.
    pub entry_date: DateTime<Utc>,
    /// Employee posting the entry.
    pub posted_by: UserId,
    /// Payment type used, if any.
    pub payment_type_id: Option<PaymentTypeId>,
    /// Teller transaction the entry belongs to, if any.
    pub transaction_id: Option<TransactionId>,
    /// Official receipt or voucher number.
    pub reference_number: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
}

impl LedgerEntryDraft {
    /// Creates a draft with no member, payment type or references.
    #[must_use]
    pub fn new(
        account: &Account,
        source: GeneralLedgerSource,
        debit: Decimal,
        credit: Decimal,
        posted_by: UserId,
        entry_date: DateTime<Utc>,
    ) -> Self {
        Self {
            organization_id: account.organization_id,
            branch_id: account.branch_id,
            account_id: account.id,
            member_profile_id: None,
            debit,
            credit,
            source,
            entry_date,
            posted_by,
            payment_type_id: None,
            transaction_id: None,
            reference_number: None,
            description: None,
        }
    }

    /// Sets the member sub-ledger.
    #[must_use]
    pub fn for_member(mut self, member_profile_id: MemberProfileId) -> Self {
        self.member_profile_id = Some(member_profile_id);
        self
    }

    /// Checks that amounts are non-negative and not both zero once rounded
    /// to the storage scale.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidAmount` otherwise.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let valid = is_magnitude(self.debit)
            && is_magnitude(self.credit)
            && !(to_storage(self.debit).is_zero() && to_storage(self.credit).is_zero());
        if valid {
            Ok(())
        } else {
            Err(LedgerError::InvalidAmount {
                debit: self.debit,
                credit: self.credit,
            })
        }
    }
}

/// A persisted, immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralLedgerEntry {
    /// Entry id.
    pub id: LedgerEntryId,
    /// Organization.
    pub organization_id: OrganizationId,
    /// Branch.
    pub branch_id: BranchId,
    /// Account posted to.
    pub account_id: AccountId,
    /// Member sub-ledger, if any.
    pub member_profile_id: Option<MemberProfileId>,
    /// Debit magnitude.
    pub debit: Decimal,
    /// Credit magnitude.
    pub credit: Decimal,
    /// Running balance of the scope after this entry.
    pub balance: Decimal,
    /// 1-based position of this entry within its scope.
    pub scope_sequence: i64,
    /// Originating business event.
    pub source: GeneralLedgerSource,
    /// Business date.
    pub entry_date: DateTime<Utc>,
    /// Insert time.
    pub created_at: DateTime<Utc>,
    /// Employee who posted it.
    pub created_by: UserId,
    /// Payment type used, if any.
    pub payment_type_id: Option<PaymentTypeId>,
    /// Teller transaction, if any.
    pub transaction_id: Option<TransactionId>,
    /// Receipt or voucher number.
    pub reference_number: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
}

/// Member dimension of a running-balance scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberScope {
    /// One balance shared by all members (institutional accounts).
    AllMembers,
    /// The balance of a single member.
    Member(MemberProfileId),
    /// Entries posted without a member.
    NoMember,
}

/// The set of entries sharing one running balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedgerScope {
    /// Organization.
    pub organization_id: OrganizationId,
    /// Branch.
    pub branch_id: BranchId,
    /// Account.
    pub account_id: AccountId,
    /// Member dimension.
    pub member: MemberScope,
}

impl LedgerScope {
    /// Scope of a posting to `account` for an optional member.
    ///
    /// Accounts of type `Other` keep one balance for every member; all
    /// other types keep one balance per member (or for member-less entries).
    #[must_use]
    pub fn for_posting(
        account: &Account,
        organization_id: OrganizationId,
        branch_id: BranchId,
        member_profile_id: Option<MemberProfileId>,
    ) -> Self {
        let member = if account.attributes.account_type.has_member_sub_ledger() {
            member_profile_id.map_or(MemberScope::NoMember, MemberScope::Member)
        } else {
            MemberScope::AllMembers
        };
        Self {
            organization_id,
            branch_id,
            account_id: account.id,
            member,
        }
    }

    /// Stable text form, used to derive lock keys.
    #[must_use]
    pub fn canonical(&self) -> String {
        let member = match self.member {
            MemberScope::AllMembers => "*".to_string(),
            MemberScope::Member(id) => id.to_string(),
            MemberScope::NoMember => "-".to_string(),
        };
        format!(
            "{}/{}/{}/{}",
            self.organization_id, self.branch_id, self.account_id, member
        )
    }
}

/// Branch posting policy flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPolicy {
    /// Enforce each account's minimum amount on withdrawals.
    pub maintain_balance: bool,
    /// Allow withdrawals to drive a balance below zero.
    pub allow_negative_withdraw_balance: bool,
}

/// The latest entry of a scope, as far as posting needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorEntry {
    /// Running balance after that entry.
    pub balance: Decimal,
    /// Its source.
    pub source: GeneralLedgerSource,
    /// Its position in the scope.
    pub scope_sequence: i64,
}

impl From<&GeneralLedgerEntry> for PriorEntry {
    fn from(entry: &GeneralLedgerEntry) -> Self {
        Self {
            balance: entry.balance,
            source: entry.source,
            scope_sequence: entry.scope_sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{AccountAttributes, AccountType, GeneralLedgerType};
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn account(account_type: AccountType) -> Account {
        Account::new(
            OrganizationId::new(),
            BranchId::new(),
            AccountAttributes::new("Savings", account_type, Some(GeneralLedgerType::Liabilities)),
            UserId::new(),
            Utc::now(),
        )
    }

    #[test]
    fn test_source_round_trips_stored_names() {
        for source in [
            GeneralLedgerSource::Withdraw,
            GeneralLedgerSource::JournalVoucher,
            GeneralLedgerSource::SavingsInterest,
            GeneralLedgerSource::Blotter,
        ] {
            assert_eq!(GeneralLedgerSource::from_str(source.as_str()), Ok(source));
        }
        assert!(GeneralLedgerSource::from_str("transfer").is_err());
    }

    #[test]
    fn test_collection_categories_cover_their_sources() {
        for category in [
            CollectionCategory::Booking,
            CollectionCategory::Disbursement,
            CollectionCategory::Journal,
        ] {
            for source in category.sources() {
                assert_eq!(source.collection_category(), Some(category));
            }
        }
        assert_eq!(GeneralLedgerSource::Blotter.collection_category(), None);
        assert_eq!(GeneralLedgerSource::Journal.collection_category(), None);
    }

    #[test]
    fn test_draft_validation() {
        let acc = account(AccountType::Deposit);
        let now = Utc::now();
        let actor = UserId::new();
        let ok = LedgerEntryDraft::new(&acc, GeneralLedgerSource::Deposit, dec!(0), dec!(10), actor, now);
        assert!(ok.validate().is_ok());

        let zero = LedgerEntryDraft::new(&acc, GeneralLedgerSource::Deposit, dec!(0), dec!(0), actor, now);
        assert!(matches!(zero.validate(), Err(LedgerError::InvalidAmount { .. })));

        let negative =
            LedgerEntryDraft::new(&acc, GeneralLedgerSource::Deposit, dec!(-1), dec!(0), actor, now);
        assert!(negative.validate().is_err());

        let dust =
            LedgerEntryDraft::new(&acc, GeneralLedgerSource::Deposit, dec!(0.00004), dec!(0), actor, now);
        assert!(matches!(dust.validate(), Err(LedgerError::InvalidAmount { .. })));

        let rounds_up =
            LedgerEntryDraft::new(&acc, GeneralLedgerSource::Deposit, dec!(0.00005), dec!(0), actor, now);
        assert!(rounds_up.validate().is_ok());
    }

    #[test]
    fn test_scope_member_dimension() {
        let member = MemberProfileId::new();

        let deposit = account(AccountType::Deposit);
        let scope = LedgerScope::for_posting(
            &deposit,
            deposit.organization_id,
            deposit.branch_id,
            Some(member),
        );
        assert_eq!(scope.member, MemberScope::Member(member));

        let no_member =
            LedgerScope::for_posting(&deposit, deposit.organization_id, deposit.branch_id, None);
        assert_eq!(no_member.member, MemberScope::NoMember);

        let other = account(AccountType::Other);
        let shared =
            LedgerScope::for_posting(&other, other.organization_id, other.branch_id, Some(member));
        assert_eq!(shared.member, MemberScope::AllMembers);
    }

    #[test]
    fn test_scope_canonical_form_distinguishes_members() {
        let deposit = account(AccountType::Deposit);
        let a = LedgerScope::for_posting(
            &deposit,
            deposit.organization_id,
            deposit.branch_id,
            Some(MemberProfileId::new()),
        );
        let b = LedgerScope::for_posting(
            &deposit,
            deposit.organization_id,
            deposit.branch_id,
            Some(MemberProfileId::new()),
        );
        assert_ne!(a.canonical(), b.canonical());
        assert_eq!(a.canonical(), a.canonical());
    }
}
