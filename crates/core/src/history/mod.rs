//! Account history snapshots and point-in-time reconstruction.
//!
//! Two kinds of snapshot exist:
//!
//! - `Created`: the account as first persisted. Its content is live from
//!   its timestamp onward, until the first update.
//! - `BeforeUpdate`: the account as it was immediately before an update,
//!   stamped with the time of that update. Its content is what was live
//!   *until* its timestamp.
//!
//! Reconstruction at time `T` therefore picks the earliest before-image
//! stamped after `T`. When no update happened after `T` the current
//! account row is the answer.

mod reconstruct;
mod snapshot;

#[cfg(test)]
mod reconstruct_props;

pub use reconstruct::{HistoryFilter, reconstruct, reconstruct_all};
pub use snapshot::{AccountSnapshot, SnapshotKind};
