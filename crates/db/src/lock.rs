//! Transaction-scoped Postgres advisory locks.
//!
//! Row locks cannot serialize the very first posting of a scope because
//! there is no row to lock yet. An advisory lock keyed by the scope covers
//! that case and is released automatically on commit or rollback.

use coopledger_core::ledger::LedgerScope;
use coopledger_shared::types::{BranchId, OrganizationId};
use sea_orm::{ConnectionTrait, DbBackend, DbErr, Statement};
use sha2::{Digest, Sha256};

/// Folds a canonical lock name into the 64-bit advisory lock key space.
pub(crate) fn lock_key(name: &str) -> i64 {
    let digest = Sha256::digest(name.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(bytes)
}

/// Lock name for a ledger running-balance scope.
pub(crate) fn scope_lock_name(scope: &LedgerScope) -> String {
    format!("ledger:{}", scope.canonical())
}

/// Lock name for a branch's chart of accounts.
pub(crate) fn chart_lock_name(organization_id: OrganizationId, branch_id: BranchId) -> String {
    format!("chart:{organization_id}/{branch_id}")
}

/// Blocks until the advisory lock `name` is held by the current transaction.
pub(crate) async fn acquire_xact_lock<C>(conn: &C, name: &str) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock($1)",
        [lock_key(name).into()],
    ))
    .await?;
    Ok(())
}
