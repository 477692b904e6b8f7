//! Merge-on-write JSON persistence, one document per site.
//!
//! Each site's products accumulate across runs in `<cache_dir>/<site>.json`
//! under sequential `P<n>` keys. A merge holds the site's lock file for the
//! whole read-modify-write and replaces the document atomically.
pub mod document;
pub mod lock;
pub mod price;

pub use document::SiteDocument;
pub use lock::SiteLock;
pub use price::format_price;

use cartscout_common::{ExtractionBatch, ProductRecord, StoreError};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// What a merge added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub path: PathBuf,
    pub added_keys: Vec<String>,
    /// Entries in the document after the merge. An empty batch never reads
    /// the document, so it reports 0.
    pub total_entries: usize,
}

impl MergeReport {
    pub fn added(&self) -> usize {
        self.added_keys.len()
    }
}

#[derive(Debug, Clone)]
pub struct ResultStore {
    cache_dir: PathBuf,
    lock_timeout: Duration,
}

impl ResultStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path_for(&self, site: &str) -> PathBuf {
        self.cache_dir.join(format!("{site}.json"))
    }

    /// Append `batch` to the site's document with prices prefixed by `currency`.
    ///
    /// An empty batch touches nothing on disk.
    pub fn merge(
        &self,
        site: &str,
        currency: &str,
        batch: &ExtractionBatch,
    ) -> Result<MergeReport, StoreError> {
        let path = self.path_for(site);
        if batch.is_empty() {
            debug!(target: "store.merge", site, "empty batch, nothing to merge");
            return Ok(MergeReport {
                path,
                added_keys: Vec::new(),
                total_entries: 0,
            });
        }

        fs::create_dir_all(&self.cache_dir).map_err(|err| StoreError::io(&self.cache_dir, err))?;
        let _lock = SiteLock::acquire(&path, self.lock_timeout)?;

        let mut document = SiteDocument::read(&path)?;
        let added_keys = batch
            .iter()
            .map(|record| {
                let stored = ProductRecord {
                    price: format_price(&record.price, currency),
                    ..record.clone()
                };
                document.push(&stored)
            })
            .collect::<Result<Vec<_>, _>>()?;
        document.write_atomic(&path)?;

        info!(
            target: "store.merge",
            site,
            path = %path.display(),
            added = added_keys.len(),
            total = document.len(),
            "merged batch"
        );
        Ok(MergeReport {
            path,
            added_keys,
            total_entries: document.len(),
        })
    }

    /// Current document for `site`, with the same recovery rules as a merge.
    pub fn load(&self, site: &str) -> Result<SiteDocument, StoreError> {
        SiteDocument::read(&self.path_for(site))
    }
}
