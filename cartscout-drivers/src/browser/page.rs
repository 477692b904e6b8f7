use cartscout_common::AcquisitionError;
use fantoccini::{error::CmdError, Client, Locator};
use std::time::Duration;
use tracing::{debug, warn};

/// Page wrapper providing the waits and reads acquisition needs.
pub struct ScoutPage {
    client: Client,
}

impl ScoutPage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Navigate to `url`.
    pub async fn goto(&mut self, url: &str) -> Result<(), AcquisitionError> {
        debug!(target: "browser.page", %url, "navigating");
        self.client
            .goto(url)
            .await
            .map_err(|e| AcquisitionError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Block until `selector` matches an element or `timeout` elapses.
    pub async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), AcquisitionError> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => {
                warn!(target: "browser.page", %selector, timeout_secs = timeout.as_secs(), "presence wait timed out");
                Err(AcquisitionError::Timeout {
                    selector: selector.to_string(),
                    waited: timeout,
                })
            }
            Err(e) => Err(AcquisitionError::Session(e.to_string())),
        }
    }

    /// Return the full page HTML source.
    pub async fn content(&self) -> Result<String, AcquisitionError> {
        self.client
            .source()
            .await
            .map_err(|e| AcquisitionError::Snapshot(e.to_string()))
    }
}
