//! Error types for the sync job

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while syncing one location's week
#[derive(Debug, Error)]
pub enum SyncError {
    /// Both request encodings failed against the order API
    #[error("Silverware request {path} failed (status {}): {body}", status_label(.status))]
    Upstream {
        path: String,
        /// Absent when the request never got a response
        status: Option<u16>,
        body: String,
    },

    /// Override write rejected by the document store
    #[error("Override write {path} failed (status {}): {body}", status_label(.status))]
    Store {
        path: String,
        status: Option<u16>,
        body: String,
    },

    /// Pagination did not terminate within the page guard
    #[error("Paging exceeded {pages} pages without reaching the end")]
    PageLimit { pages: u32 },

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SyncError {
    /// HTTP status of the failed call, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Upstream { status, .. } | SyncError::Store { status, .. } => *status,
            _ => None,
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
