//! Common types used across the workspace.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{STORAGE_SCALE, is_magnitude, to_storage};
