//! Core ledger logic for Coopledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `account` - Chart of accounts, ordering and deletion rules
//! - `history` - Account snapshots and point-in-time reconstruction
//! - `ledger` - Running balances, balance policies, vouchers, member summaries
//! - `events` - Typed change notifications
//! - `error` - Error taxonomy shared by all modules

pub mod account;
pub mod error;
pub mod events;
pub mod history;
pub mod ledger;

pub use error::{ErrorKind, LedgerError, PolicyKind, PolicyViolation};
