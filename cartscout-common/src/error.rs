//! Error types used across the cartscout pipeline.
//!
//! Acquisition and extraction failures are recoverable at the orchestrator
//! boundary ("no valid results"); store failures mean a run's batch was not
//! persisted. None of them is retried.
use std::path::PathBuf;
use std::time::Duration;

/// The page could not be loaded or never showed its results marker.
#[derive(thiserror::Error, Debug)]
pub enum AcquisitionError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("selector `{selector}` did not appear within {}s", .waited.as_secs())]
    Timeout { selector: String, waited: Duration },

    #[error("browser session error: {0}")]
    Session(String),

    #[error("no supported browser found on {os}")]
    NoSupportedBrowser { os: String },

    #[error("page snapshot unavailable: {0}")]
    Snapshot(String),
}

/// A page was acquired but no trustworthy batch could be built from it.
#[derive(thiserror::Error, Debug)]
pub enum ExtractionError {
    #[error("no results found on {site} page (`{selector}` matched nothing)")]
    NoResults { site: String, selector: String },

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("unknown site `{0}` (expected one of: amazon, myntra)")]
    UnknownSite(String),

    #[error("extraction fault on {site}: {reason}")]
    Fault { site: String, reason: String },
}

/// The site document could not be read, locked or written.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store I/O failed at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize site document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("timed out after {}ms waiting for lock {}", .waited.as_millis(), .path.display())]
    LockTimeout { path: PathBuf, waited: Duration },

    #[error("no key after P{largest} is available")]
    KeySpaceExhausted { largest: u64 },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Umbrella error for callers that drive the whole pipeline.
#[derive(thiserror::Error, Debug)]
pub enum CartscoutError {
    #[error("acquisition failed: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("store failed: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl CartscoutError {
    /// Acquisition and extraction failures collapse to "no valid results".
    pub fn is_no_results(&self) -> bool {
        matches!(
            self,
            CartscoutError::Acquisition(_) | CartscoutError::Extraction(_)
        )
    }
}

/// Convenient alias for results that use [`CartscoutError`].
pub type Result<T> = std::result::Result<T, CartscoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_selector_and_wait() {
        let err = AcquisitionError::Timeout {
            selector: "li.product-base".into(),
            waited: Duration::from_secs(10),
        };
        assert_eq!(
            err.to_string(),
            "selector `li.product-base` did not appear within 10s"
        );
    }

    #[test]
    fn only_upstream_failures_count_as_no_results() {
        let acq: CartscoutError = AcquisitionError::Session("gone".into()).into();
        let ext: CartscoutError = ExtractionError::UnknownSite("ebay".into()).into();
        let store: CartscoutError = StoreError::io(
            "/tmp/x.json",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        )
        .into();
        assert!(acq.is_no_results());
        assert!(ext.is_no_results());
        assert!(!store.is_no_results());
    }
}
