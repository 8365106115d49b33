//! Liveness probing of proxy addresses
//!
//! One probe is a single GET for the reachability target routed through the
//! candidate proxy. A batch launches every probe concurrently and joins on
//! all of them; a candidate is live only when the target answered 200 within
//! the timeout.

use crate::harvest::models::{ProbeReport, ProbeStatus, ProxyAddress};
use crate::Result;
use futures::stream::{self, StreamExt};
use log::info;
use reqwest::{Client, Proxy, StatusCode};
use std::time::{Duration, Instant};

/// Default timeout for a single probe in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default number of concurrent probes
const DEFAULT_CONCURRENCY: usize = 50;

/// Default reachability target fetched through every candidate
const DEFAULT_TARGET_URL: &str = "http://www.baidu.com";

/// Configuration for the proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for each probe
    pub timeout: Duration,
    /// Number of probes in flight at once
    pub concurrency: usize,
    /// URL fetched through every candidate proxy
    pub target_url: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            target_url: DEFAULT_TARGET_URL.to_string(),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_target_url(mut self, url: String) -> Self {
        self.target_url = url;
        self
    }
}

/// Probes candidate proxies against the reachability target
pub struct ProxyChecker {
    config: CheckerConfig,
}

impl ProxyChecker {
    /// Create a new proxy checker with default configuration
    pub fn new() -> Self {
        Self {
            config: CheckerConfig::default(),
        }
    }

    /// Create a new proxy checker with custom configuration
    pub fn with_config(config: CheckerConfig) -> Self {
        Self { config }
    }

    /// Probe a single proxy with one GET against the target URL.
    ///
    /// Every network-level failure settles into the report; this never
    /// returns an error and never retries. Only an exact 200 within the
    /// timeout counts as alive.
    pub async fn probe(&self, address: &ProxyAddress) -> ProbeReport {
        let start = Instant::now();

        match self.build_client(address) {
            Ok(client) => {
                match tokio::time::timeout(
                    self.config.timeout,
                    client.get(&self.config.target_url).send(),
                )
                .await
                {
                    Ok(Ok(response)) => {
                        if response.status() == StatusCode::OK {
                            let elapsed = start.elapsed().as_millis() as u64;
                            ProbeReport::alive(address.clone(), elapsed)
                        } else {
                            ProbeReport::dead(
                                address.clone(),
                                format!("HTTP status: {}", response.status()),
                            )
                        }
                    }
                    Ok(Err(e)) => ProbeReport::dead(address.clone(), e.to_string()),
                    Err(_) => ProbeReport::timeout(address.clone()),
                }
            }
            Err(e) => ProbeReport::dead(address.clone(), e.to_string()),
        }
    }

    /// Probe every address concurrently and wait for all of them.
    ///
    /// Duplicates are probed independently. Reports come back in launch
    /// order no matter which probe settles first, and one probe failing can
    /// never abort its siblings.
    pub async fn probe_all(&self, addresses: &[ProxyAddress]) -> Vec<ProbeReport> {
        let concurrency = self.config.concurrency.max(1);

        stream::iter(addresses)
            .map(|address| self.probe(address))
            .buffered(concurrency)
            .collect::<Vec<_>>()
            .await
    }

    /// The live subset of `addresses`, in launch order.
    ///
    /// Logs one status line per input address.
    pub async fn validate(&self, addresses: &[ProxyAddress]) -> Vec<ProxyAddress> {
        let reports = self.probe_all(addresses).await;

        let mut live = Vec::new();
        for report in reports {
            match report.status {
                ProbeStatus::Alive => {
                    info!(
                        "{} alive ({} ms)",
                        report.address,
                        report.elapsed_ms.unwrap_or_default()
                    );
                    live.push(report.address);
                }
                ProbeStatus::Dead(ref reason) => info!("{} dead: {}", report.address, reason),
                ProbeStatus::Timeout => info!(
                    "{} dead: no response within {:?}",
                    report.address, self.config.timeout
                ),
            }
        }
        live
    }

    /// Build a client that routes requests through the given proxy
    fn build_client(&self, address: &ProxyAddress) -> Result<Client> {
        let proxy = Proxy::all(address.as_str())?;
        let client = Client::builder()
            .proxy(proxy)
            .timeout(self.config.timeout)
            .build()?;
        Ok(client)
    }
}

impl Default for ProxyChecker {
    fn default() -> Self {
        Self::new()
    }
}
