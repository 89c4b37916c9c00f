//! silverware-sync: weekly sales overrides from Silverware POS data
//!
//! Pulls a week of orders per restaurant location from the Silverware API,
//! aggregates food sales, voids and promotions, and merge-writes one override
//! document per location and week into Firestore.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod runner;
pub mod silverware;
pub mod store;
pub mod utils;

pub use config::{Config, ConfigError, LocationConfig, LocationSetting};
pub use error::{SyncError, SyncResult};
pub use runner::{LocationOutcome, RunSummary, SyncJob};
