//! Discovery of proxy pool endpoints through a search engine
//!
//! Pool services are found by querying a search engine for pages matching a
//! fixed expression. The query travels base64-encoded in the URL and the
//! result page is scraped for host links; every href becomes a candidate
//! pool endpoint, kept verbatim.

use crate::harvest::models::EndpointUrl;
use crate::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

/// Default search engine endpoint
const DEFAULT_SEARCH_URL: &str = "https://fofa.info/result";

/// Default search expression matching proxy pool services
const DEFAULT_QUERY: &str = r#"body="get all proxy from proxy pool""#;

/// Default timeout for search page requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent for HTTP requests
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Selector matching the host link of each search result row
static HOST_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.hsxa-host > a").expect("Invalid host link selector"));

/// A source of pool endpoints
#[async_trait]
pub trait DiscoverySource {
    /// Discover candidate pool endpoints
    async fn discover(&self) -> Result<Vec<EndpointUrl>>;
}

/// Configuration for search-based discovery
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Search engine endpoint
    pub search_url: String,
    /// Search expression identifying pool services
    pub query: String,
    /// Timeout for HTTP requests
    pub timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            query: DEFAULT_QUERY.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl DiscoveryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_url(mut self, search_url: String) -> Self {
        self.search_url = search_url;
        self
    }

    pub fn with_query(mut self, query: String) -> Self {
        self.query = query;
        self
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

/// Search engine backed discovery of pool endpoints
pub struct SearchDiscovery {
    config: DiscoveryConfig,
    client: Client,
}

impl SearchDiscovery {
    /// Create a new discovery source with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(DiscoveryConfig::default())
    }

    /// Create a new discovery source with custom configuration
    pub fn with_config(config: DiscoveryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { config, client })
    }

    /// The full search URL with the base64-encoded query parameter
    pub fn query_url(&self) -> String {
        format!(
            "{}?qbase64={}",
            self.config.search_url,
            STANDARD.encode(&self.config.query)
        )
    }

    /// Pull endpoint hrefs out of a search result page, in document order
    fn extract_endpoints(html: &str) -> Vec<EndpointUrl> {
        Html::parse_document(html)
            .select(&HOST_LINK_SELECTOR)
            .filter_map(|element| element.value().attr("href"))
            .map(EndpointUrl::from)
            .collect()
    }
}

#[async_trait]
impl DiscoverySource for SearchDiscovery {
    async fn discover(&self) -> Result<Vec<EndpointUrl>> {
        let url = self.query_url();
        debug!("querying {}", url);

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(Self::extract_endpoints(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::testutil::{closed_port_addr, serve_fixed};

    const RESULTS_PAGE: &str = r#"
<html><body>
  <div class="hsxa-meta-data-list">
    <span class="hsxa-host"><a href="https://1.2.3.4:5010">1.2.3.4:5010</a></span>
    <a href="https://decoy.test">elsewhere</a>
    <span class="hsxa-host"><a href="http://proxy-pool.test:8000">proxy-pool.test:8000</a></span>
    <span class="hsxa-host"><a>no link target</a></span>
  </div>
</body></html>
"#;

    #[test]
    fn test_discovery_config_default() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.search_url, DEFAULT_SEARCH_URL);
        assert_eq!(config.query, DEFAULT_QUERY);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_discovery_config_builder() {
        let config = DiscoveryConfig::new()
            .with_search_url("http://search.test".to_string())
            .with_query("port=3128".to_string())
            .with_timeout(Duration::from_secs(10))
            .with_user_agent("Custom Agent".to_string());

        assert_eq!(config.search_url, "http://search.test");
        assert_eq!(config.query, "port=3128");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.user_agent, "Custom Agent");
    }

    #[test]
    fn test_query_url_encodes_expression() {
        let discovery = SearchDiscovery::new().unwrap();
        assert_eq!(
            discovery.query_url(),
            "https://fofa.info/result?qbase64=Ym9keT0iZ2V0IGFsbCBwcm94eSBmcm9tIHByb3h5IHBvb2wi"
        );
    }

    #[test]
    fn test_extract_endpoints_from_results_page() {
        let endpoints = SearchDiscovery::extract_endpoints(RESULTS_PAGE);
        assert_eq!(
            endpoints,
            vec![
                EndpointUrl::from("https://1.2.3.4:5010"),
                EndpointUrl::from("http://proxy-pool.test:8000"),
            ]
        );
    }

    #[test]
    fn test_extract_endpoints_empty_document() {
        let endpoints = SearchDiscovery::extract_endpoints("<html><body></body></html>");
        assert!(endpoints.is_empty());
    }

    #[tokio::test]
    async fn test_discover_fetches_and_extracts() {
        let addr = serve_fixed(200, RESULTS_PAGE).await;
        let discovery = SearchDiscovery::with_config(
            DiscoveryConfig::new().with_search_url(format!("http://{}", addr)),
        )
        .unwrap();

        let endpoints = discovery.discover().await.unwrap();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0], EndpointUrl::from("https://1.2.3.4:5010"));
    }

    #[tokio::test]
    async fn test_discover_error_when_search_unreachable() {
        let addr = closed_port_addr().await;
        let discovery = SearchDiscovery::with_config(
            DiscoveryConfig::new()
                .with_search_url(format!("http://{}", addr))
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap();

        assert!(discovery.discover().await.is_err());
    }

    #[tokio::test]
    async fn test_discover_error_on_error_status() {
        let addr = serve_fixed(500, "search is down").await;
        let discovery = SearchDiscovery::with_config(
            DiscoveryConfig::new().with_search_url(format!("http://{}", addr)),
        )
        .unwrap();

        assert!(discovery.discover().await.is_err());
    }
}
