use crate::browser::{capabilities::build_capabilities, page::ScoutPage};
use cartscout_common::{AcquisitionError, BrowserKind};
use fantoccini::{Client, ClientBuilder};
use tracing::{debug, info};

/// Thin wrapper around a `fantoccini` WebDriver client.
pub struct ScoutDriver {
    client: Client,
    kind: BrowserKind,
}

impl ScoutDriver {
    /// Open a new session on a running WebDriver service at `webdriver_url`.
    pub async fn connect(
        webdriver_url: &str,
        kind: BrowserKind,
        headless: bool,
    ) -> Result<Self, AcquisitionError> {
        let caps = build_capabilities(kind, headless);
        debug!(target: "browser.session", %webdriver_url, browser = %kind, headless, "connecting");

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .map_err(|e| AcquisitionError::Session(e.to_string()))?;

        info!(target: "browser.session", browser = %kind, "session opened");
        Ok(Self { client, kind })
    }

    /// Navigate to `url` and return a [`ScoutPage`] bound to this session.
    pub async fn goto(&self, url: &str) -> Result<ScoutPage, AcquisitionError> {
        let mut page = ScoutPage::new(self.client.clone());
        page.goto(url).await?;
        Ok(page)
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<(), AcquisitionError> {
        self.client
            .close()
            .await
            .map_err(|e| AcquisitionError::Session(e.to_string()))?;
        info!(target: "browser.session", browser = %self.kind, "session closed");
        Ok(())
    }
}
