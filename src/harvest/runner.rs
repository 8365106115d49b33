//! End-to-end harvest runs
//!
//! A run walks the whole pipeline: discover pool endpoints, fetch and
//! validate their listings, revalidate whatever the store already holds,
//! then persist the merged live set. Discovery and endpoint failures only
//! shrink the result; store I/O is the one thing that aborts a run.

use crate::harvest::checker::ProxyChecker;
use crate::harvest::discovery::DiscoverySource;
use crate::harvest::fetcher::PoolFetcher;
use crate::harvest::models::ProxyAddress;
use crate::harvest::store::ProxyStore;
use crate::Result;
use log::{info, warn};
use std::collections::HashSet;

/// Counters from a completed harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Pool endpoints discovered
    pub endpoints: usize,
    /// Freshly harvested addresses that probed alive
    pub new_live: usize,
    /// Addresses the store held before the run
    pub old_candidates: usize,
    /// Stored addresses that still probed alive
    pub old_live: usize,
    /// Addresses written back to the store
    pub persisted: usize,
}

/// Drives discovery, fetching, validation and persistence as one run
pub struct HarvestRunner {
    discovery: Box<dyn DiscoverySource + Send + Sync>,
    fetcher: PoolFetcher,
    checker: ProxyChecker,
    store: ProxyStore,
}

impl HarvestRunner {
    pub fn new(
        discovery: impl DiscoverySource + Send + Sync + 'static,
        fetcher: PoolFetcher,
        checker: ProxyChecker,
        store: ProxyStore,
    ) -> Self {
        Self {
            discovery: Box::new(discovery),
            fetcher,
            checker,
            store,
        }
    }

    /// Execute one harvest run and return its counters.
    ///
    /// A failed discovery degrades to an empty endpoint list, so stored
    /// addresses still get revalidated. The persisted set is new live
    /// addresses first, then surviving stored ones, first occurrence kept
    /// on exact duplicates.
    pub async fn run(&self) -> Result<RunSummary> {
        let endpoints = match self.discovery.discover().await {
            Ok(endpoints) => {
                info!("discovered {} pool endpoints", endpoints.len());
                endpoints
            }
            Err(e) => {
                warn!("discovery failed: {}", e);
                Vec::new()
            }
        };

        let new_live = self.fetcher.harvest(&endpoints, &self.checker).await;

        let old_candidates = self.store.load_or_create()?;
        info!("revalidating {} stored proxies", old_candidates.len());
        let old_live = self.checker.validate(&old_candidates).await;

        let mut summary = RunSummary {
            endpoints: endpoints.len(),
            new_live: new_live.len(),
            old_candidates: old_candidates.len(),
            old_live: old_live.len(),
            persisted: 0,
        };

        let mut merged = new_live;
        merged.extend(old_live);
        let merged = dedup_addresses(merged);

        self.store.save(&merged)?;
        summary.persisted = merged.len();
        info!(
            "persisted {} live proxies to {}",
            merged.len(),
            self.store.path().display()
        );

        Ok(summary)
    }
}

/// Drop exact duplicates, keeping the first occurrence of each address
fn dedup_addresses(addresses: Vec<ProxyAddress>) -> Vec<ProxyAddress> {
    let mut seen = HashSet::new();
    addresses
        .into_iter()
        .filter(|address| seen.insert(address.clone()))
        .collect()
}
