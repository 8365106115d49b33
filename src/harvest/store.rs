//! Flat-file persistence of live proxy addresses

use crate::harvest::models::ProxyAddress;
use crate::Result;
use anyhow::Context;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Line-oriented store of proxy addresses.
///
/// One address per line, no metadata. Each run replaces the file wholesale,
/// so entries are only as fresh as the most recent run. Store I/O is the one
/// error class a run cannot recover from.
#[derive(Debug, Clone)]
pub struct ProxyStore {
    path: PathBuf,
}

impl ProxyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored address, creating an empty store first if the file
    /// is absent.
    pub fn load_or_create(&self) -> Result<Vec<ProxyAddress>> {
        if !self.path.exists() {
            fs::write(&self.path, "")
                .with_context(|| format!("cannot create store file {}", self.path.display()))?;
            info!("created store file {}", self.path.display());
        }
        self.load()
    }

    /// Read every stored address. A missing file is an error.
    pub fn load(&self) -> Result<Vec<ProxyAddress>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read store file {}", self.path.display()))?;
        Ok(content
            .lines()
            .filter(|line| !line.is_empty())
            .map(ProxyAddress::from)
            .collect())
    }

    /// Replace the entire store with `addresses`, one per line.
    pub fn save(&self, addresses: &[ProxyAddress]) -> Result<()> {
        let mut content = String::new();
        for address in addresses {
            content.push_str(address.as_str());
            content.push('\n');
        }
        fs::write(&self.path, content)
            .with_context(|| format!("cannot write store file {}", self.path.display()))?;
        Ok(())
    }
}
