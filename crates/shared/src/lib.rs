//! Shared types and configuration for Coopledger.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Money helpers for storage-scale rounding
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
