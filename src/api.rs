//! REST access to the middleware's namespace-scoped list endpoints.
//!
//! List endpoints come in two shapes: paged (`{"items": [...], "total": n}`
//! when `count` is requested) and unpaged (a bare JSON array). Both decode to
//! a [`Page`].

use async_trait::async_trait;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

use crate::query::ListQuery;
use crate::types::{Page, Record, Resource};

/// Everything that can go wrong between issuing a list request and holding a decoded page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}

/// Anything that can produce a page of records for a query
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_page(
        &self,
        namespace: &str,
        resource: Resource,
        query: &ListQuery,
    ) -> Result<Page<Record>, FetchError>;
}

/// `<api-root>/namespaces/<ns>/<resource>?<query>`
pub fn build_url(api_root: &str, namespace: &str, resource: Resource, query: &ListQuery) -> String {
    format!(
        "{}/namespaces/{}/{}?{}",
        api_root.trim_end_matches('/'),
        urlencoding::encode(namespace),
        resource.path(),
        query.query_string()
    )
}

/// Decode a list response body. `skip` is the offset the request was issued with,
/// used to derive a total for unpaged (bare array) responses.
pub fn parse_page(body: Value, resource: Resource, skip: u64) -> Result<Page<Record>, FetchError> {
    let (raw_items, total) = match body {
        Value::Array(items) => {
            let total = skip + items.len() as u64;
            (items, total)
        }
        Value::Object(mut obj) => {
            let items = match obj.remove("items") {
                Some(Value::Array(items)) => items,
                Some(Value::Null) | None => Vec::new(),
                Some(other) => {
                    return Err(FetchError::Decode(format!(
                        "\"items\" is not an array (got {})",
                        json_kind(&other)
                    )))
                }
            };
            let total = match obj.get("total") {
                Some(v) => v.as_u64().ok_or_else(|| {
                    FetchError::Decode(format!("\"total\" is not a count (got {v})"))
                })?,
                None => skip + items.len() as u64,
            };
            (items, total)
        }
        other => {
            return Err(FetchError::Decode(format!(
                "expected object or array, got {}",
                json_kind(&other)
            )))
        }
    };

    let items = raw_items
        .into_iter()
        .map(|v| resource.decode(v))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Page { items, total })
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

static HTTP: OnceLock<reqwest::Client> = OnceLock::new();

fn http_client() -> &'static reqwest::Client {
    HTTP.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .unwrap_or_default()
    })
}

/// Fetches pages over HTTP from a live node
#[derive(Clone, Debug)]
pub struct HttpSource {
    pub api_root: String,
    pub timeout_ms: u64,
    pub retries: u32,
    pub auth_token: Option<String>,
}

impl HttpSource {
    pub fn new(api_root: impl Into<String>, timeout_ms: u64, retries: u32) -> Self {
        Self { api_root: api_root.into(), timeout_ms, retries, auth_token: None }
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch_page(
        &self,
        namespace: &str,
        resource: Resource,
        query: &ListQuery,
    ) -> Result<Page<Record>, FetchError> {
        let url = build_url(&self.api_root, namespace, resource, query);
        log::debug!("[api] GET {url}");

        let mut req = http_client()
            .get(&url)
            .timeout(Duration::from_millis(self.timeout_ms));
        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }

        let res = crate::net::send_with_backoff(req, resource.path(), self.retries).await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(FetchError::Status { status: status.as_u16(), body: error_message(&body) });
        }

        let body: Value = res.json().await?;
        parse_page(body, resource, query.skip())
    }
}

/// Pull `{"error": "..."}` out of an error body, else return it trimmed
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}
