//! TfL unified API HTTP client.
//!
//! Only one endpoint is used: `GET /StopPoint/{id}/Arrivals?line={line}`.
//! Credentials are optional; without them requests run against the anonymous
//! rate limit.

use std::time::Duration;

use tracing::debug;

use super::error::FetchError;
use super::types::{ArrivalPrediction, parse_arrivals};

/// Default base URL for the TfL unified API.
pub const DEFAULT_BASE_URL: &str = "https://api.tfl.gov.uk";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Application credentials sent as `app_id` / `app_key` query parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub app_id: String,
    pub app_key: String,
}

impl Credentials {
    /// Build credentials only when both halves are present and non-empty.
    pub fn from_parts(app_id: Option<String>, app_key: Option<String>) -> Option<Self> {
        let app_id = app_id.filter(|s| !s.trim().is_empty())?;
        let app_key = app_key.filter(|s| !s.trim().is_empty())?;
        Some(Self { app_id, app_key })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_key", &"<redacted>")
            .finish()
    }
}

/// Configuration for the TfL client.
#[derive(Debug, Clone)]
pub struct TflConfig {
    /// Base URL for the API (defaults to production TfL)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Optional application credentials
    pub credentials: Option<Credentials>,
}

impl TflConfig {
    /// Create a config pointing at production TfL with no credentials.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            credentials: None,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Attach application credentials.
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }
}

impl Default for TflConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// TfL arrivals client.
#[derive(Debug, Clone)]
pub struct TflClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl TflClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TflConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials,
        })
    }

    /// Fetch every arrival prediction for `line_id` at `stop_id`.
    ///
    /// The response is returned unfiltered and in upstream order.
    pub async fn get_arrivals(
        &self,
        stop_id: &str,
        line_id: &str,
    ) -> Result<Vec<ArrivalPrediction>, FetchError> {
        let url = format!("{}/StopPoint/{}/Arrivals", self.base_url, stop_id);

        let mut query = vec![("line", line_id)];
        if let Some(credentials) = &self.credentials {
            query.push(("app_id", credentials.app_id.as_str()));
            query.push(("app_key", credentials.app_key.as_str()));
        }

        debug!(stop_id, line_id, authenticated = self.credentials.is_some(), "requesting arrivals");

        let response = self.http.get(&url).query(&query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::status(status.as_u16(), &body));
        }

        let body = response.text().await?;
        let predictions = parse_arrivals(&body)?;

        debug!(stop_id, count = predictions.len(), "received arrivals");
        Ok(predictions)
    }
}
