//! KMB open-data HTTP client.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{ArrivalRecord, Stop, StopId};

use super::error::NetworkError;
use super::types::{EtaResponse, StopListResponse};

/// Default base URL for the KMB open-data API.
const DEFAULT_BASE_URL: &str = "https://data.etabus.gov.hk/v1/transport/kmb";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the directory client.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Base URL for the API, without a trailing slash
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DirectoryConfig {
    /// Create a config pointing at the production API.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the stop list and stop ETA endpoints.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl DirectoryClient {
    /// Create a new directory client.
    pub fn new(config: DirectoryConfig) -> Result<Self, NetworkError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Fetch every stop in the network.
    pub async fn fetch_stop_list(&self) -> Result<Vec<Stop>, NetworkError> {
        let url = format!("{}/stop", self.base_url);
        let response: StopListResponse = self.get_json(&url).await?;

        Ok(response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(Stop::from)
            .collect())
    }

    /// Fetch arrival predictions for one stop.
    ///
    /// A missing or empty `data` field means no arrivals, not an error.
    pub async fn fetch_arrivals(&self, stop_id: &StopId) -> Result<Vec<ArrivalRecord>, NetworkError> {
        let url = format!("{}/stop-eta/{}", self.base_url, stop_id.as_str());
        let response: EtaResponse = self.get_json(&url).await?;

        Ok(response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(ArrivalRecord::from)
            .collect())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, NetworkError> {
        debug!(url, "fetching");
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NetworkError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| NetworkError::Json {
            message: e.to_string(),
        })
    }
}
