use anyhow::{Context, Result};
use cartscout_app::{Pipeline, RunOutcome, prompt};
use cartscout_common::CartscoutError;
use cartscout_common::observability::{LogConfig, init_logging};
use cartscout_config::{CartscoutConfig, CartscoutConfigLoader, DEFAULT_CONFIG_FILE};
use cartscout_drivers::{PageAcquirer, SnapshotAcquirer, WebDriverAcquirer};
use cartscout_extract::{Site, SiteAdapter};
use cartscout_store::ResultStore;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Scrape one marketplace search page and add its products to the local cache.
#[derive(Debug, Parser)]
#[command(name = "cartscout", version, about)]
struct Cli {
    /// Search text; prompted for on stdin when omitted.
    query: Option<String>,

    /// Marketplace to search.
    #[arg(long, default_value = "myntra")]
    site: Site,

    /// YAML configuration file (default: ./cartscout.yaml if present).
    #[arg(long, env = "CARTSCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Replay a saved results page instead of driving a browser.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// WebDriver endpoint, overriding the configured one.
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Show the browser window.
    #[arg(long)]
    headed: bool,
}

fn load_config(cli: &Cli) -> Result<CartscoutConfig> {
    let loader = match &cli.config {
        Some(path) => CartscoutConfigLoader::new().with_file(path),
        None => CartscoutConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let mut config = loader
        .load()
        .map_err(|e| CartscoutError::Config(e.to_string()))?;

    if let Some(url) = &cli.webdriver_url {
        config.browser.webdriver_url = url.clone();
    }
    if cli.headed {
        config.browser.headless = false;
    }
    Ok(config)
}

async fn open_acquirer(
    cli: &Cli,
    config: &CartscoutConfig,
) -> Result<Box<dyn PageAcquirer>, cartscout_common::AcquisitionError> {
    match &cli.snapshot {
        Some(path) => Ok(Box::new(SnapshotAcquirer::from_file(path)?)),
        None => {
            let browser = &config.browser;
            let acquirer =
                WebDriverAcquirer::connect(&browser.webdriver_url, browser.kind, browser.headless)
                    .await?;
            Ok(Box::new(acquirer))
        }
    }
}

fn report(site: Site, query: &str, outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Stored(merge) => println!(
            "Saved {} {site} products for \"{query}\" to {} ({} total).",
            merge.added(),
            merge.path.display(),
            merge.total_entries
        ),
        RunOutcome::NoResults { .. } => {
            println!("No valid results found for \"{query}\" on {site}.")
        }
        RunOutcome::NotPersisted { found, error } => println!(
            "Found {found} {site} products for \"{query}\" but could not save them: {error}"
        ),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli).context("failed to load configuration")?;

    let log_path = init_logging(LogConfig {
        log_dir: config.logging.dir.clone(),
        emit_stderr: config.logging.stderr,
        format: config.logging.format,
        default_filter: config.logging.filter.clone(),
        ..LogConfig::default()
    })?;
    info!(target: "app", log = %log_path.display(), site = %cli.site, "cartscout starting");

    let query = match &cli.query {
        Some(query) if !query.trim().is_empty() => query.trim().to_string(),
        _ => prompt::read_query(std::io::stdin().lock(), std::io::stdout())?,
    };

    let adapter = SiteAdapter::for_site(cli.site)?;
    let store = ResultStore::new(&config.store.cache_dir)
        .with_lock_timeout(Duration::from_millis(config.store.lock_timeout_ms));
    let pipeline = Pipeline::new(
        adapter,
        store,
        Duration::from_secs(config.acquisition.wait_timeout_secs),
    );

    let outcome = match open_acquirer(&cli, &config).await {
        Ok(mut acquirer) => pipeline.run(acquirer.as_mut(), &query).await,
        Err(err) => {
            warn!(target: "app", error = %err, "no page acquirer available");
            RunOutcome::no_results(err)
        }
    };
    report(cli.site, &query, &outcome);
    Ok(())
}
