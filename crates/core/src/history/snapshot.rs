//! History snapshot rows.

use chrono::{DateTime, Utc};
use coopledger_shared::types::{AccountHistoryId, AccountId, BranchId, OrganizationId, UserId};
use serde::{Deserialize, Serialize};

use crate::account::{Account, AccountAttributes};

/// Why a snapshot was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotKind {
    /// After-image written when the account was created.
    Created,
    /// Before-image written just ahead of an update.
    BeforeUpdate,
}

impl SnapshotKind {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::BeforeUpdate => "before_update",
        }
    }
}

impl std::str::FromStr for SnapshotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "before_update" => Ok(Self::BeforeUpdate),
            _ => Err(format!("Unknown snapshot kind: {s}")),
        }
    }
}

/// Immutable copy of an account at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Snapshot id.
    pub id: AccountHistoryId,
    /// Account the snapshot belongs to.
    pub account_id: AccountId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Owning branch.
    pub branch_id: BranchId,
    /// Why the snapshot was written.
    pub kind: SnapshotKind,
    /// Copied account attributes.
    pub attributes: AccountAttributes,
    /// When the snapshot was written.
    pub created_at: DateTime<Utc>,
    /// Secondary ordering key for snapshots sharing `created_at`.
    pub updated_at: DateTime<Utc>,
    /// Who caused the snapshot.
    pub created_by: UserId,
}

impl AccountSnapshot {
    /// Captures `account` as a snapshot of the given kind.
    #[must_use]
    pub fn capture(
        account: &Account,
        kind: SnapshotKind,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AccountHistoryId::new(),
            account_id: account.id,
            organization_id: account.organization_id,
            branch_id: account.branch_id,
            kind,
            attributes: account.attributes.clone(),
            created_at: at,
            updated_at: at,
            created_by: actor,
        }
    }

    /// Rebuilds the account as it looked in this snapshot.
    ///
    /// Audit fields are taken from the snapshot itself.
    #[must_use]
    pub fn to_account(&self) -> Account {
        Account {
            id: self.account_id,
            organization_id: self.organization_id,
            branch_id: self.branch_id,
            attributes: self.attributes.clone(),
            created_at: self.created_at,
            created_by: self.created_by,
            updated_at: self.updated_at,
            updated_by: self.created_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{AccountType, GeneralLedgerType};
    use coopledger_shared::types::{AccountId, BranchId, OrganizationId};
    use rust_decimal_macros::dec;

    fn loan() -> Account {
        let mut attributes = AccountAttributes::new(
            "Salary Loan",
            AccountType::Loan,
            Some(GeneralLedgerType::Assets),
        );
        attributes.terms.interest_standard = dec!(2.5);
        attributes.loan_account_id = Some(AccountId::new());
        Account::new(
            OrganizationId::new(),
            BranchId::new(),
            attributes,
            UserId::new(),
            Utc::now(),
        )
    }

    #[test]
    fn test_capture_copies_attributes_and_stamps_time() {
        let account = loan();
        let at = account.created_at + chrono::Duration::hours(1);
        let snapshot =
            AccountSnapshot::capture(&account, SnapshotKind::BeforeUpdate, UserId::new(), at);

        assert_eq!(snapshot.account_id, account.id);
        assert_eq!(snapshot.attributes, account.attributes);
        assert_eq!(snapshot.created_at, at);
        assert_eq!(snapshot.updated_at, at);
    }

    #[test]
    fn test_attributes_survive_json_storage() {
        let account = loan();
        let json = serde_json::to_value(&account.attributes).unwrap();

        // Decimals serialize as strings.
        assert_eq!(json["terms"]["interest_standard"], "2.5");
        let back: AccountAttributes = serde_json::from_value(json).unwrap();
        assert_eq!(back, account.attributes);
    }

    #[test]
    fn test_to_account_rebuilds_identity() {
        let account = loan();
        let snapshot = AccountSnapshot::capture(
            &account,
            SnapshotKind::Created,
            account.created_by,
            account.created_at,
        );
        let rebuilt = snapshot.to_account();

        assert_eq!(rebuilt.id, account.id);
        assert!(rebuilt.is_in_scope(account.organization_id, account.branch_id));
        assert_eq!(rebuilt.attributes, account.attributes);
    }

    #[test]
    fn test_kind_round_trips_through_storage_name() {
        for kind in [SnapshotKind::Created, SnapshotKind::BeforeUpdate] {
            assert_eq!(kind.as_str().parse::<SnapshotKind>(), Ok(kind));
        }
        assert!("updated".parse::<SnapshotKind>().is_err());
    }
}
