//! Shared types for silverware-sync
//!
//! Weekly override models, money helpers and small utilities used by the
//! sync job and its tests.

pub mod models;
pub mod money;
pub mod util;

// Re-exports
pub use models::{OverrideDocument, OverrideMeta, WeeklyTotals};
