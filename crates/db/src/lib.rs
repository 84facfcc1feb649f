//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions mapped to the core domain types
//! - Repositories for accounts, history, ordering, posting and summaries
//! - Database migrations
//!
//! Posting and history capture take a caller-owned `DatabaseTransaction`
//! so they commit or roll back together with the caller's own writes.

pub mod entities;
pub mod error;
mod lock;
pub mod migration;
pub mod repositories;

pub use error::StoreError;
pub use repositories::{
    AccountHistoryRepository, AccountIndexRepository, AccountRepository, BranchSettings,
    BranchSettingsRepository, CreateAccountInput, GeneralLedgerRepository,
    MemberLedgerRepository, ReindexOutcome,
};

use std::time::Duration;

use coopledger_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database with default pool settings.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Every repository over one shared connection pool.
#[derive(Debug, Clone)]
pub struct LedgerStores {
    /// Chart of accounts.
    pub accounts: AccountRepository,
    /// Account snapshots and reconstruction.
    pub history: AccountHistoryRepository,
    /// Chart ordering.
    pub index: AccountIndexRepository,
    /// General ledger posting and queries.
    pub ledger: GeneralLedgerRepository,
    /// Member accounting ledger summaries.
    pub members: MemberLedgerRepository,
    /// Branch posting policy and singleton accounts.
    pub branches: BranchSettingsRepository,
}

impl LedgerStores {
    /// Builds every repository over `db`.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            accounts: AccountRepository::new(db.clone()),
            history: AccountHistoryRepository::new(db.clone()),
            index: AccountIndexRepository::new(db.clone()),
            ledger: GeneralLedgerRepository::new(db.clone()),
            members: MemberLedgerRepository::new(db.clone()),
            branches: BranchSettingsRepository::new(db),
        }
    }
}
