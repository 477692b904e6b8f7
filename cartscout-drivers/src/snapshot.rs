use crate::acquirer::PageAcquirer;
use cartscout_common::AcquisitionError;
use scraper::{Html, Selector};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Acquirer that serves a saved HTML document instead of a live browser.
///
/// Whatever URL is loaded, the same markup is returned. `wait_for` succeeds
/// iff the selector matches the saved document; otherwise it reports the
/// timeout a live browser would have hit, without sleeping.
#[derive(Debug, Clone)]
pub struct SnapshotAcquirer {
    html: String,
    loaded: Option<Url>,
    closed: bool,
}

impl SnapshotAcquirer {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            loaded: None,
            closed: false,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AcquisitionError> {
        let path = path.as_ref();
        let html = std::fs::read_to_string(path)
            .map_err(|e| AcquisitionError::Snapshot(format!("{}: {e}", path.display())))?;
        Ok(Self::new(html))
    }

    /// URL of the last `load`, if any.
    pub fn loaded_url(&self) -> Option<&Url> {
        self.loaded.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), AcquisitionError> {
        if self.closed {
            Err(AcquisitionError::Session("session already closed".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl PageAcquirer for SnapshotAcquirer {
    async fn load(&mut self, url: &Url) -> Result<(), AcquisitionError> {
        self.ensure_open()?;
        debug!(target: "browser.snapshot", %url, bytes = self.html.len(), "serving snapshot");
        self.loaded = Some(url.clone());
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), AcquisitionError> {
        self.ensure_open()?;
        if self.loaded.is_none() {
            return Err(AcquisitionError::Snapshot("no page loaded".into()));
        }
        let parsed = Selector::parse(selector)
            .map_err(|e| AcquisitionError::Snapshot(format!("invalid selector `{selector}`: {e}")))?;
        let present = Html::parse_document(&self.html)
            .select(&parsed)
            .next()
            .is_some();
        if present {
            Ok(())
        } else {
            Err(AcquisitionError::Timeout {
                selector: selector.to_string(),
                waited: timeout,
            })
        }
    }

    async fn snapshot(&mut self) -> Result<String, AcquisitionError> {
        self.ensure_open()?;
        if self.loaded.is_none() {
            return Err(AcquisitionError::Snapshot("no page loaded".into()));
        }
        Ok(self.html.clone())
    }

    async fn close(&mut self) -> Result<(), AcquisitionError> {
        self.closed = true;
        Ok(())
    }
}
