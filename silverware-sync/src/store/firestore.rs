//! Firestore integration via REST API (no SDK dependency)
//!
//! A `PATCH` with an update mask writes only the masked fields, creating the
//! document when it does not exist. That is the REST form of `set` with merge.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{Value, json};
use shared::models::OverrideDocument;
use shared::util::iso_millis;

use crate::config::{ConfigError, FirestoreConfig};
use crate::error::{SyncError, SyncResult};
use crate::store::{OverrideStore, override_path};

/// Field paths merged on every write
pub const UPDATE_MASK: &[&str] = &[
    "food_sales",
    "voids",
    "comps",
    "meta.orders",
    "meta.days_scanned",
    "meta.last_run",
];

pub struct FirestoreStore {
    client: Client,
    documents_root: Url,
    access_token: Option<String>,
    tenant: String,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig) -> SyncResult<Self> {
        let mut documents_root =
            Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| ConfigError::Invalid {
                name: "FIRESTORE_BASE_URL",
                value: config.base_url.clone(),
                reason: e.to_string(),
            })?;
        documents_root
            .path_segments_mut()
            .map_err(|_| ConfigError::Invalid {
                name: "FIRESTORE_BASE_URL",
                value: config.base_url.clone(),
                reason: "cannot be a base URL".into(),
            })?
            .pop_if_empty()
            .extend([
                "projects",
                config.project_id.as_str(),
                "databases",
                config.database.as_str(),
                "documents",
            ]);

        let client = Client::builder()
            .user_agent(concat!("silverware-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            documents_root,
            access_token: config.access_token.clone(),
            tenant: config.tenant.clone(),
        })
    }

    fn document_url(&self, location_key: &str, week_id: &str) -> Url {
        let mut url = self.documents_root.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(override_path(&self.tenant, location_key, week_id));
        }
        url
    }
}

#[async_trait]
impl OverrideStore for FirestoreStore {
    async fn write_override(
        &self,
        location_key: &str,
        week_id: &str,
        document: &OverrideDocument,
    ) -> SyncResult<()> {
        let url = self.document_url(location_key, week_id);
        let path = override_path(&self.tenant, location_key, week_id).join("/");
        let mask: Vec<(&str, &str)> = UPDATE_MASK
            .iter()
            .map(|field| ("updateMask.fieldPaths", *field))
            .collect();

        let mut request = self
            .client
            .patch(url)
            .query(&mask)
            .json(&firestore_fields(document));
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| SyncError::Store {
            path: path.clone(),
            status: None,
            body: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("failed to read response body: {e}"));
            return Err(SyncError::Store {
                path,
                status: Some(status.as_u16()),
                body,
            });
        }

        tracing::debug!(path = %path, "Override written");
        Ok(())
    }
}

/// Firestore typed-value encoding of an override document
pub fn firestore_fields(document: &OverrideDocument) -> Value {
    json!({
        "fields": {
            "food_sales": { "doubleValue": document.food_sales },
            "voids": { "doubleValue": document.voids },
            "comps": { "doubleValue": document.comps },
            "meta": {
                "mapValue": {
                    "fields": {
                        "orders": { "integerValue": document.meta.orders.to_string() },
                        "days_scanned": { "integerValue": document.meta.days_scanned.to_string() },
                        "last_run": { "timestampValue": iso_millis(document.meta.last_run) },
                    }
                }
            }
        }
    })
}
