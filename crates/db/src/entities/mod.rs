//! `SeaORM` entity definitions and conversions to core domain types.
//!
//! Enumerations are stored as text and parsed through the core types'
//! `FromStr` implementations; a value that fails to parse means the row
//! was written outside this crate and is reported as `StoreError::Corrupt`.

pub mod account_histories;
pub mod accounts;
pub mod branch_settings;
pub mod general_ledger_entries;
pub mod member_accounting_ledgers;

use std::str::FromStr;

use uuid::Uuid;

use crate::error::StoreError;

/// Parses a text column into a core enum.
pub(crate) fn parse_column<T>(table: &'static str, id: Uuid, value: &str) -> Result<T, StoreError>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|reason| StoreError::Corrupt { table, id, reason })
}

/// Parses a nullable text column into an optional core enum.
pub(crate) fn parse_optional_column<T>(
    table: &'static str,
    id: Uuid,
    value: Option<&str>,
) -> Result<Option<T>, StoreError>
where
    T: FromStr<Err = String>,
{
    value.map(|v| parse_column(table, id, v)).transpose()
}
