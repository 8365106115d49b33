//! Proxy Harvester - Pool Discovery and Liveness Checking
//!
//! This crate discovers proxy-pool services from a search engine's results
//! page, drains each pool's proxy listing, probes every candidate through a
//! reachability target, and persists only the proxies that are alive.

pub mod harvest;

pub use harvest::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
