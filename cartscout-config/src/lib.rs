//! Loader for cartscout configuration with YAML + environment overlays.
//!
//! Every field has a default, so an empty configuration is valid. Precedence,
//! lowest first: built-in defaults, YAML file(s) and inline snippets in the
//! order they were added, then `CARTSCOUT__SECTION__KEY` environment
//! variables. String values may contain `${VAR}` placeholders which are
//! expanded after merging.
use cartscout_common::BrowserKind;
use cartscout_common::observability::LogFormat;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// File consulted by the binary when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "cartscout.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CartscoutConfig {
    pub browser: BrowserSettings,
    pub acquisition: AcquisitionSettings,
    pub store: StoreSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    /// `None` means detect from the OS and installed browsers.
    pub kind: Option<BrowserKind>,
    pub headless: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            kind: None,
            headless: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AcquisitionSettings {
    /// How long to wait for a site's presence selector.
    pub wait_timeout_secs: u64,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            wait_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub cache_dir: PathBuf,
    pub lock_timeout_ms: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("_cache"),
            lock_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub stderr: bool,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            stderr: false,
            filter: "info".into(),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct CartscoutConfigLoader {
    files: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for CartscoutConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CartscoutConfigLoader {
    /// Start with no file sources; environment overrides are applied last.
    ///
    /// ```
    /// use cartscout_config::CartscoutConfigLoader;
    ///
    /// let config = CartscoutConfigLoader::new().load().expect("defaults load");
    /// assert_eq!(config.acquisition.wait_timeout_secs, 10);
    /// assert_eq!(config.browser.webdriver_url, "http://localhost:9515");
    /// ```
    pub fn new() -> Self {
        Self {
            files: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files = self
            .files
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files = self
            .files
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use cartscout_config::CartscoutConfigLoader;
    ///
    /// let cfg = CartscoutConfigLoader::new()
    ///     .with_yaml_str("store:\n  cache_dir: /tmp/scout\n")
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.store.cache_dir, std::path::PathBuf::from("/tmp/scout"));
    /// assert_eq!(cfg.store.lock_timeout_ms, 5000);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.files = self
            .files
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    pub fn load(self) -> Result<CartscoutConfig, ConfigError> {
        let cfg = self
            .files
            .add_source(
                Environment::with_prefix("CARTSCOUT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
