use crate::browser::{capabilities::detect_browser, driver::ScoutDriver, page::ScoutPage};
use cartscout_common::{AcquisitionError, BrowserKind};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Source of rendered search-result pages.
///
/// Callers drive one acquisition as `load` → `wait_for` → `snapshot` and must
/// call `close` on every exit path. `close` is idempotent.
#[async_trait::async_trait]
pub trait PageAcquirer: Send {
    async fn load(&mut self, url: &Url) -> Result<(), AcquisitionError>;

    /// Fails with [`AcquisitionError::Timeout`] if `selector` never matches.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), AcquisitionError>;

    async fn snapshot(&mut self) -> Result<String, AcquisitionError>;

    async fn close(&mut self) -> Result<(), AcquisitionError>;
}

/// Acquirer backed by a live WebDriver session.
pub struct WebDriverAcquirer {
    driver: Option<ScoutDriver>,
    page: Option<ScoutPage>,
}

impl WebDriverAcquirer {
    /// Open a session; `kind = None` detects the browser from the host.
    pub async fn connect(
        webdriver_url: &str,
        kind: Option<BrowserKind>,
        headless: bool,
    ) -> Result<Self, AcquisitionError> {
        let kind = match kind {
            Some(kind) => kind,
            None => detect_browser()?,
        };
        let driver = ScoutDriver::connect(webdriver_url, kind, headless).await?;
        Ok(Self {
            driver: Some(driver),
            page: None,
        })
    }

    fn driver(&self) -> Result<&ScoutDriver, AcquisitionError> {
        self.driver
            .as_ref()
            .ok_or_else(|| AcquisitionError::Session("session already closed".into()))
    }

    fn page(&self) -> Result<&ScoutPage, AcquisitionError> {
        self.page
            .as_ref()
            .ok_or_else(|| AcquisitionError::Snapshot("no page loaded".into()))
    }
}

#[async_trait::async_trait]
impl PageAcquirer for WebDriverAcquirer {
    async fn load(&mut self, url: &Url) -> Result<(), AcquisitionError> {
        let page = self.driver()?.goto(url.as_str()).await?;
        self.page = Some(page);
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), AcquisitionError> {
        self.page()?.wait_for(selector, timeout).await
    }

    async fn snapshot(&mut self) -> Result<String, AcquisitionError> {
        self.page()?.content().await
    }

    async fn close(&mut self) -> Result<(), AcquisitionError> {
        self.page = None;
        match self.driver.take() {
            Some(driver) => driver.close().await.inspect_err(|e| {
                warn!(target: "browser.session", error = %e, "closing session failed");
            }),
            None => Ok(()),
        }
    }
}
