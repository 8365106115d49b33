//! Fetching candidate proxies from pool endpoints
//!
//! Every discovered pool service exposes its full listing at `<endpoint>/all`
//! as a JSON array of objects carrying a `proxy` field. A fetch either yields
//! the whole listing or fails as a unit; failures stay scoped to their
//! endpoint.

use crate::harvest::checker::ProxyChecker;
use crate::harvest::models::{EndpointUrl, ProxyAddress};
use crate::Result;
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Default timeout for pool listing requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default user agent for HTTP requests
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// One entry of a pool listing
#[derive(Debug, Deserialize)]
struct PoolEntry {
    proxy: ProxyAddress,
}

/// Result of fetching a single pool endpoint
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The endpoint that was fetched
    pub endpoint: EndpointUrl,
    /// Candidate addresses listed by the endpoint
    pub candidates: Vec<ProxyAddress>,
    /// Error message if the fetch failed
    pub error: Option<String>,
}

impl FetchResult {
    /// Create a successful fetch result
    pub fn success(endpoint: EndpointUrl, candidates: Vec<ProxyAddress>) -> Self {
        Self {
            endpoint,
            candidates,
            error: None,
        }
    }

    /// Create a failed fetch result
    pub fn failure(endpoint: EndpointUrl, error: String) -> Self {
        Self {
            endpoint,
            candidates: Vec::new(),
            error: Some(error),
        }
    }

    /// Check if the fetch was successful
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Configuration for the pool fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Timeout for HTTP requests
    pub timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Pool fetcher for pulling candidate listings from discovered endpoints
pub struct PoolFetcher {
    client: Client,
}

impl PoolFetcher {
    /// Create a new pool fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(FetcherConfig::default())
    }

    /// Create a new pool fetcher with custom configuration
    pub fn with_config(config: FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch the full candidate listing of a single endpoint.
    ///
    /// Listing order and duplicates are preserved exactly as served. A
    /// non-success status, a timeout, or a malformed listing fails the
    /// endpoint as a whole.
    pub async fn fetch_endpoint(&self, endpoint: &EndpointUrl) -> Result<Vec<ProxyAddress>> {
        let url = format!("{}/all", endpoint);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let entries: Vec<PoolEntry> = response.json().await?;
        Ok(entries.into_iter().map(|entry| entry.proxy).collect())
    }

    /// Fetch multiple endpoints, returning a result for each
    pub async fn fetch_all(&self, endpoints: &[EndpointUrl]) -> Vec<FetchResult> {
        let mut results = Vec::new();

        for endpoint in endpoints {
            let result = match self.fetch_endpoint(endpoint).await {
                Ok(candidates) => FetchResult::success(endpoint.clone(), candidates),
                Err(e) => FetchResult::failure(endpoint.clone(), e.to_string()),
            };
            results.push(result);
        }

        results
    }

    /// Fetch every endpoint and keep the candidates that probe alive.
    ///
    /// Endpoints are processed in order; each listing is validated as soon
    /// as it arrives and the live subsets accumulate across endpoints. An
    /// endpoint that fails to fetch contributes nothing.
    pub async fn harvest(
        &self,
        endpoints: &[EndpointUrl],
        checker: &ProxyChecker,
    ) -> Vec<ProxyAddress> {
        let mut live = Vec::new();

        for endpoint in endpoints {
            match self.fetch_endpoint(endpoint).await {
                Ok(candidates) => {
                    info!("{}: {} candidates", endpoint, candidates.len());
                    live.extend(checker.validate(&candidates).await);
                }
                Err(e) => warn!("{}: fetch failed: {}", endpoint, e),
            }
        }

        live
    }
}
