//! Chart of accounts.
//!
//! This module provides:
//! - Account types and their snapshot-able attributes
//! - Chart ordering (full reindex and fractional insertion keys)
//! - Deletion rules

pub mod deletion;
pub mod index;
pub mod types;

#[cfg(test)]
mod index_props;

pub use deletion::{AccountReferences, BranchAccountReferences, DeletionBlocker, check_deletable};
pub use index::{INDEX_STEP, IndexAssignment, chart_order, insertion_index, reindex};
pub use types::{
    Account, AccountAttributes, AccountType, ComputationTerms, ComputationType,
    GeneralLedgerType, InterestStandardComputation, LumpsumComputationType, PostingSources,
    UNCLASSIFIED_RANK, group_rank,
};
