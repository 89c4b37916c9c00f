//! Sync job configuration
//!
//! Everything comes from environment variables (a `.env` file is loaded first by
//! the binary). Per-location settings use `SILVERWARE_<KEY>_BASE_URL` and
//! `SILVERWARE_<KEY>_TOKEN`, where `<KEY>` is the location key uppercased with
//! non-alphanumerics replaced by `_`.

use thiserror::Error;

use crate::silverware::fields::FoodHints;

pub const DEFAULT_TENANT: &str = "default";
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_FIRESTORE_DATABASE: &str = "(default)";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {name} '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings for one restaurant location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationConfig {
    pub key: String,
    pub base_url: String,
    pub token: String,
}

/// A configured location key, possibly missing its connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSetting {
    pub key: String,
    pub base_url: Option<String>,
    pub token: Option<String>,
}

impl LocationSetting {
    /// Complete connection settings, or None when either is missing
    pub fn resolve(&self) -> Option<LocationConfig> {
        Some(LocationConfig {
            key: self.key.clone(),
            base_url: self.base_url.clone()?,
            token: self.token.clone()?,
        })
    }

    /// Names of the missing settings, for the skip warning
    pub fn missing(&self) -> Vec<String> {
        let prefix = location_env_prefix(&self.key);
        let mut missing = Vec::new();
        if self.base_url.is_none() {
            missing.push(format!("{prefix}_BASE_URL"));
        }
        if self.token.is_none() {
            missing.push(format!("{prefix}_TOKEN"));
        }
        missing
    }
}

/// Firestore REST settings
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub database: String,
    /// Bearer token; the emulator accepts unauthenticated writes
    pub access_token: Option<String>,
    /// Tenant namespace at the root of every override path
    pub tenant: String,
}

/// Sync job configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Locations in processing order
    pub locations: Vec<LocationSetting>,
    pub food_hints: FoodHints,
    /// None when FIRESTORE_PROJECT_ID is unset (only usable for dry runs)
    pub firestore: Option<FirestoreConfig>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let keys = get("SILVERWARE_LOCATIONS").ok_or(ConfigError::Missing("SILVERWARE_LOCATIONS"))?;
        let locations: Vec<LocationSetting> = keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|key| {
                let prefix = location_env_prefix(key);
                LocationSetting {
                    key: key.to_string(),
                    base_url: get(&format!("{prefix}_BASE_URL")),
                    token: get(&format!("{prefix}_TOKEN")),
                }
            })
            .collect();
        if locations.is_empty() {
            return Err(ConfigError::Missing("SILVERWARE_LOCATIONS"));
        }

        let food_hints = get("FOOD_CATEGORY_HINTS")
            .map(|raw| FoodHints::parse(&raw))
            .unwrap_or_default();

        let firestore = get("FIRESTORE_PROJECT_ID").map(|project_id| FirestoreConfig {
            base_url: get("FIRESTORE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_FIRESTORE_BASE_URL.into()),
            project_id,
            database: get("FIRESTORE_DATABASE")
                .unwrap_or_else(|| DEFAULT_FIRESTORE_DATABASE.into()),
            access_token: get("FIRESTORE_ACCESS_TOKEN"),
            tenant: get("OVERRIDE_TENANT").unwrap_or_else(|| DEFAULT_TENANT.into()),
        });

        Ok(Self {
            locations,
            food_hints,
            firestore,
        })
    }

    /// Keep only the given location keys (configured order is preserved)
    pub fn restrict_to(&mut self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        self.locations.retain(|l| keys.iter().any(|k| k == &l.key));
    }
}

/// `downtown-2` -> `SILVERWARE_DOWNTOWN_2`
pub fn location_env_prefix(key: &str) -> String {
    let normalized: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("SILVERWARE_{normalized}")
}
