//! Silverware order API client
//!
//! Every call is tried with a JSON body first and, if that fails for any
//! reason, once more with the same parameters in the query string.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value, json};
use shared::util::iso_millis;

use crate::config::LocationConfig;
use crate::error::{SyncError, SyncResult};
use crate::silverware::fields::PAGE_SIZE;
use crate::utils::WeekWindow;

pub const LIST_ORDERS_PATH: &str = "/Orders/GetOrders";
pub const GET_ORDER_PATH: &str = "/Orders/GetOrder";

/// Source of raw order payloads for one location
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// One page (1-based) of orders active within the window
    async fn list_orders(
        &self,
        location: &LocationConfig,
        window: &WeekWindow,
        page: u32,
    ) -> SyncResult<Value>;

    /// Full detail of one order
    async fn get_order(&self, location: &LocationConfig, order_id: &str) -> SyncResult<Value>;
}

/// How request parameters are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEncoding {
    /// `POST` with a JSON object body
    JsonBody,
    /// `GET` with query-string parameters
    QueryString,
}

impl RequestEncoding {
    pub const PRIMARY: Self = RequestEncoding::JsonBody;
    pub const FALLBACK: Self = RequestEncoding::QueryString;
}

/// HTTP client for the Silverware API
#[derive(Debug, Clone)]
pub struct SilverwareClient {
    client: Client,
}

impl SilverwareClient {
    pub fn new() -> SyncResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("silverware-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Primary encoding, then the fallback; the fallback's failure is returned
    async fn call(
        &self,
        location: &LocationConfig,
        path: &str,
        params: &Map<String, Value>,
    ) -> SyncResult<Value> {
        match self
            .send(location, path, RequestEncoding::PRIMARY, params)
            .await
        {
            Ok(body) => Ok(body),
            Err(primary) => {
                tracing::warn!(
                    location = %location.key,
                    path,
                    error = %primary,
                    "Primary request failed, retrying with query string"
                );
                self.send(location, path, RequestEncoding::FALLBACK, params)
                    .await
            }
        }
    }

    async fn send(
        &self,
        location: &LocationConfig,
        path: &str,
        encoding: RequestEncoding,
        params: &Map<String, Value>,
    ) -> SyncResult<Value> {
        let url = format!("{}{}", location.base_url.trim_end_matches('/'), path);
        let request = match encoding {
            RequestEncoding::JsonBody => self.client.post(&url).json(params),
            RequestEncoding::QueryString => self.client.get(&url).query(&query_pairs(params)),
        };

        let response = request
            .bearer_auth(&location.token)
            .send()
            .await
            .map_err(|e| upstream(path, None, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| upstream(path, Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(upstream(path, Some(status.as_u16()), text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| upstream(path, Some(status.as_u16()), format!("invalid JSON: {e}")))
    }
}

#[async_trait]
impl OrderSource for SilverwareClient {
    async fn list_orders(
        &self,
        location: &LocationConfig,
        window: &WeekWindow,
        page: u32,
    ) -> SyncResult<Value> {
        let params = list_params(window, page);
        tracing::debug!(location = %location.key, page, "Listing orders");
        self.call(location, LIST_ORDERS_PATH, &params).await
    }

    async fn get_order(&self, location: &LocationConfig, order_id: &str) -> SyncResult<Value> {
        let params = object(json!({ "OrderID": order_id }));
        tracing::debug!(location = %location.key, order_id, "Fetching order detail");
        self.call(location, GET_ORDER_PATH, &params).await
    }
}

pub fn list_params(window: &WeekWindow, page: u32) -> Map<String, Value> {
    object(json!({
        "StartDate": iso_millis(window.start),
        "EndDate": iso_millis(window.end),
        "Page": page,
        "PageSize": PAGE_SIZE,
    }))
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Flatten scalar parameters for the query string
fn query_pairs(params: &Map<String, Value>) -> Vec<(&str, String)> {
    params
        .iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.as_str(), v)
        })
        .collect()
}

fn upstream(path: &str, status: Option<u16>, body: String) -> SyncError {
    SyncError::Upstream {
        path: path.to_string(),
        status,
        body,
    }
}
