//! External service module
//!
//! This module contains the filesystem persistence of timer snapshots.

pub mod snapshot;

// Re-export main functions
pub use snapshot::*;
