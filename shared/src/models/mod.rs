//! Data models
//!
//! The weekly override document is the only persisted output of a sync run.

pub mod weekly_override;

// Re-exports
pub use weekly_override::*;
