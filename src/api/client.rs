//! HTTP client for the stats API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde_json::Value;
use tracing::debug;

use super::retry::{RetryConfig, with_retry};
use crate::{Result, ScoutboardError};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body echoed into an [`ScoutboardError::Api`] message.
const MAX_ERROR_BODY: usize = 256;

/// Source of `{ "<collection>": [...] }` responses.
///
/// Implemented by [`ApiClient`]; tests and embedders substitute their own.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Source name for logging/debugging.
    fn name(&self) -> &str;

    /// GET `path` and return the array stored under `collection`.
    ///
    /// Non-success statuses and transport failures are errors; an empty
    /// collection is not.
    async fn fetch_collection(&self, path: &str, collection: &str) -> Result<Vec<Value>>;
}

/// reqwest-backed [`CollectionSource`].
///
/// ```rust,no_run
/// # use scoutboard::api::{ApiClient, CollectionSource};
/// # async fn example() -> scoutboard::Result<()> {
/// let client = ApiClient::new("http://localhost:8000")?;
/// let players = client.fetch_collection("/players/leaders", "players").await?;
/// println!("{} leaders", players.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl ApiClient {
    /// Client with the default timeout and no retries.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Client with a custom per-request timeout and no retries.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ScoutboardError::Configuration(format!(
                "API base URL must start with http:// or https://, got {base_url:?}"
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoutboardError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryConfig::disabled(),
        })
    }

    /// Retry transient failures with exponential backoff.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    async fn fetch_once(&self, url: &str, collection: &str) -> Result<Vec<Value>> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ScoutboardError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            if message.len() > MAX_ERROR_BODY {
                let mut end = MAX_ERROR_BODY;
                while !message.is_char_boundary(end) {
                    end -= 1;
                }
                message.truncate(end);
            }
            return Err(ScoutboardError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        extract_collection(body, collection)
    }
}

#[async_trait]
impl CollectionSource for ApiClient {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn fetch_collection(&self, path: &str, collection: &str) -> Result<Vec<Value>> {
        let url = self.url(path);
        debug!(%url, collection, "GET");
        with_retry(&self.retry, path, || self.fetch_once(&url, collection)).await
    }
}

/// Pull the `collection` array out of a response body.
fn extract_collection(body: Value, collection: &str) -> Result<Vec<Value>> {
    let Value::Object(mut fields) = body else {
        return Err(ScoutboardError::Json(format!(
            "expected a JSON object wrapping `{collection}`"
        )));
    };
    match fields.remove(collection) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) => Ok(Vec::new()),
        Some(other) => Err(ScoutboardError::Json(format!(
            "`{collection}` is not an array (found {})",
            json_type(&other)
        ))),
        None => Err(ScoutboardError::Json(format!(
            "response has no `{collection}` field"
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
