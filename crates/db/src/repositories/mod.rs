//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod account_history;
pub mod account_index;
pub mod branch_settings;
pub mod general_ledger;
pub mod member_ledger;

pub use account::{AccountRepository, CreateAccountInput};
pub use account_history::AccountHistoryRepository;
pub use account_index::{AccountIndexRepository, ReindexOutcome};
pub use branch_settings::{BranchSettings, BranchSettingsRepository};
pub use general_ledger::GeneralLedgerRepository;
pub use member_ledger::MemberLedgerRepository;

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the precision Postgres stores (microseconds).
pub(crate) fn db_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
