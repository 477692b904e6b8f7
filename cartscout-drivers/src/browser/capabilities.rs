use cartscout_common::{AcquisitionError, BrowserKind};
use serde_json::json;
use webdriver::capabilities::Capabilities;

const CHROME_BINARIES: &[&str] = &["google-chrome", "chrome", "chromium", "chromium-browser"];

/// Pick a browser the way a desktop install usually has one available.
///
/// Windows always gets Edge. macOS and Linux prefer Chrome, then Firefox;
/// macOS falls back to Safari, which ships with the OS.
pub fn detect_browser() -> Result<BrowserKind, AcquisitionError> {
    detect_for(std::env::consts::OS, |bin| which::which(bin).is_ok())
}

fn detect_for(
    os: &str,
    on_path: impl Fn(&str) -> bool,
) -> Result<BrowserKind, AcquisitionError> {
    match os {
        "windows" => Ok(BrowserKind::Edge),
        "macos" | "linux" => {
            if CHROME_BINARIES.iter().any(|&bin| on_path(bin)) {
                Ok(BrowserKind::Chrome)
            } else if on_path("firefox") {
                Ok(BrowserKind::Firefox)
            } else if os == "macos" {
                Ok(BrowserKind::Safari)
            } else {
                Err(AcquisitionError::NoSupportedBrowser { os: os.to_string() })
            }
        }
        other => Err(AcquisitionError::NoSupportedBrowser {
            os: other.to_string(),
        }),
    }
}

/// Command-line arguments passed to the browser binary.
pub fn browser_arguments(kind: BrowserKind, headless: bool) -> Vec<String> {
    if !headless {
        return Vec::new();
    }
    match kind {
        BrowserKind::Chrome | BrowserKind::Edge => {
            vec!["--headless".to_string(), "--disable-gpu".to_string()]
        }
        BrowserKind::Firefox => vec!["-headless".to_string()],
        // Safari has no headless mode.
        BrowserKind::Safari => Vec::new(),
    }
}

/// Build WebDriver session capabilities for `kind`.
pub fn build_capabilities(kind: BrowserKind, headless: bool) -> Capabilities {
    let mut caps = Capabilities::new();
    let args = browser_arguments(kind, headless);
    match kind {
        BrowserKind::Chrome => {
            caps.insert("browserName".to_string(), json!("chrome"));
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        BrowserKind::Edge => {
            caps.insert("browserName".to_string(), json!("MicrosoftEdge"));
            caps.insert("ms:edgeOptions".to_string(), json!({ "args": args }));
        }
        BrowserKind::Firefox => {
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
        BrowserKind::Safari => {
            caps.insert("browserName".to_string(), json!("safari"));
        }
    }
    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_always_uses_edge() {
        assert_eq!(detect_for("windows", |_| false).unwrap(), BrowserKind::Edge);
    }

    #[test]
    fn prefers_chrome_then_firefox() {
        assert_eq!(
            detect_for("linux", |bin| bin == "chromium" || bin == "firefox").unwrap(),
            BrowserKind::Chrome
        );
        assert_eq!(
            detect_for("linux", |bin| bin == "firefox").unwrap(),
            BrowserKind::Firefox
        );
    }

    #[test]
    fn macos_falls_back_to_safari_but_linux_fails() {
        assert_eq!(detect_for("macos", |_| false).unwrap(), BrowserKind::Safari);
        assert!(matches!(
            detect_for("linux", |_| false),
            Err(AcquisitionError::NoSupportedBrowser { .. })
        ));
        assert!(detect_for("freebsd", |_| true).is_err());
    }

    #[test]
    fn headless_flags_follow_browser_family() {
        let caps = build_capabilities(BrowserKind::Chrome, true);
        assert_eq!(
            caps["goog:chromeOptions"]["args"],
            json!(["--headless", "--disable-gpu"])
        );

        let caps = build_capabilities(BrowserKind::Firefox, true);
        assert_eq!(caps["moz:firefoxOptions"]["args"], json!(["-headless"]));

        assert!(browser_arguments(BrowserKind::Edge, false).is_empty());
        assert!(browser_arguments(BrowserKind::Safari, true).is_empty());
    }
}
