//! Weekly override persistence

pub mod firestore;

use async_trait::async_trait;
use shared::models::OverrideDocument;

use crate::error::SyncResult;

pub use firestore::FirestoreStore;

/// Merge-writes one override document per location and week
#[async_trait]
pub trait OverrideStore: Send + Sync {
    async fn write_override(
        &self,
        location_key: &str,
        week_id: &str,
        document: &OverrideDocument,
    ) -> SyncResult<()>;
}

/// Path segments of an override document below the database root
pub fn override_path<'a>(tenant: &'a str, location_key: &'a str, week_id: &'a str) -> [&'a str; 6] {
    [
        "tenants",
        tenant,
        "locations",
        location_key,
        "weekly_overrides",
        week_id,
    ]
}

/// Logs documents instead of writing them
#[derive(Debug, Default)]
pub struct DryRunStore;

#[async_trait]
impl OverrideStore for DryRunStore {
    async fn write_override(
        &self,
        location_key: &str,
        week_id: &str,
        document: &OverrideDocument,
    ) -> SyncResult<()> {
        let body = serde_json::to_string(document).unwrap_or_default();
        tracing::info!(location = %location_key, week = %week_id, document = %body, "Dry run, override not written");
        Ok(())
    }
}
