//! Harvest module for discovering, validating, and persisting proxies
//!
//! This module provides functionality for:
//! - Discovering proxy-pool endpoints from a search results page
//! - Fetching each pool's current proxy listing
//! - Probing candidates concurrently against a reachability target
//! - Persisting the live set to a flat text file

pub mod checker;
pub mod discovery;
pub mod fetcher;
pub mod models;
pub mod runner;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use checker::{CheckerConfig, ProxyChecker};
pub use discovery::{DiscoveryConfig, DiscoverySource, SearchDiscovery};
pub use fetcher::{FetchResult, FetcherConfig, PoolFetcher};
pub use models::{EndpointUrl, ProbeReport, ProbeStatus, ProxyAddress};
pub use runner::{HarvestRunner, RunSummary};
pub use store::ProxyStore;
