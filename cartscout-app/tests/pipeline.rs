use cartscout_app::{Pipeline, RunOutcome};
use cartscout_common::AcquisitionError;
use cartscout_drivers::{PageAcquirer, SnapshotAcquirer};
use cartscout_extract::{Site, SiteAdapter};
use cartscout_store::ResultStore;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

const MYNTRA_RESULTS: &str = r#"<html><body><ul class="results-base">
  <li class="product-base">
    <a data-refreshpage="true" href="tshirts/hrx/hrx-men-tee/101/buy">
      <img class="img-responsive" src="https://assets.myntassets.com/101.jpg">
      <h3 class="product-brand">HRX</h3>
      <h4 class="product-product">Men Training Tee</h4>
      <div class="product-price"><span>Rs. 599</span></div>
    </a>
  </li>
  <li class="product-base">
    <a data-refreshpage="true" href="tshirts/puma/puma-tee/202/buy">
      <img class="img-responsive" src="https://assets.myntassets.com/202.jpg">
      <h3 class="product-brand">Puma</h3>
      <h4 class="product-product">Logo Tee</h4>
      <div class="product-price"><span>Rs. 1,099</span></div>
    </a>
  </li>
</ul></body></html>"#;

fn pipeline(cache: &Path) -> Pipeline {
    Pipeline::new(
        SiteAdapter::for_site(Site::Myntra).unwrap(),
        ResultStore::new(cache),
        Duration::from_secs(10),
    )
}

#[tokio::test]
async fn results_are_stored_and_acquirer_closed() {
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("_cache");
    let mut acquirer = SnapshotAcquirer::new(MYNTRA_RESULTS);

    let outcome = pipeline(&cache).run(&mut acquirer, "men tee").await;

    let report = match outcome {
        RunOutcome::Stored(report) => report,
        other => panic!("expected stored outcome, got {other:?}"),
    };
    assert_eq!(report.added_keys, vec!["P1", "P2"]);
    assert_eq!(report.path, cache.join("myntra.json"));
    assert!(acquirer.is_closed());
    assert_eq!(
        acquirer.loaded_url().map(Url::as_str),
        Some("https://www.myntra.com/men-tee?rawQuery=men+tee")
    );

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report.path).unwrap()).unwrap();
    assert_eq!(doc["P1"]["name"], "Men Training Tee");
    assert_eq!(doc["P1"]["brand"], "HRX");
    assert_eq!(doc["P1"]["price"], "₹599");
    assert_eq!(
        doc["P2"]["link"],
        "https://www.myntra.com/tshirts/puma/puma-tee/202/buy"
    );
}

#[tokio::test]
async fn missing_results_marker_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("_cache");
    let mut acquirer =
        SnapshotAcquirer::new("<html><body><div class=\"index-zeroResults\"></div></body></html>");

    let outcome = pipeline(&cache).run(&mut acquirer, "zzzz").await;

    match outcome {
        RunOutcome::NoResults { reason } => {
            assert!(reason.contains("did not appear"), "reason: {reason}");
            assert!(reason.contains("li.product-base"), "reason: {reason}");
        }
        other => panic!("expected NoResults, got {other:?}"),
    }
    assert!(acquirer.is_closed());
    assert!(!cache.join("myntra.json").exists());
}

#[tokio::test]
async fn extraction_failure_still_closes() {
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("_cache");
    let mut acquirer = SnapshotAcquirer::new(
        r#"<ul><li class="product-base"></li><li class="product-base"></li></ul>"#,
    );

    let outcome = pipeline(&cache).run(&mut acquirer, "placeholder").await;

    assert!(matches!(outcome, RunOutcome::NoResults { .. }));
    assert!(acquirer.is_closed());
    assert!(!cache.exists());
}

#[tokio::test]
async fn unwritable_cache_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("_cache");
    fs::write(&cache, "not a directory").unwrap();
    let mut acquirer = SnapshotAcquirer::new(MYNTRA_RESULTS);

    let outcome = pipeline(&cache).run(&mut acquirer, "tee").await;

    match outcome {
        RunOutcome::NotPersisted { found, .. } => assert_eq!(found, 2),
        other => panic!("expected NotPersisted, got {other:?}"),
    }
    assert!(acquirer.is_closed());
}

/// Fails navigation and records whether it was closed.
#[derive(Default)]
struct BrokenBrowser {
    closes: usize,
}

#[async_trait::async_trait]
impl PageAcquirer for BrokenBrowser {
    async fn load(&mut self, url: &Url) -> Result<(), AcquisitionError> {
        Err(AcquisitionError::Navigation {
            url: url.to_string(),
            reason: "connection refused".into(),
        })
    }

    async fn wait_for(&mut self, _: &str, _: Duration) -> Result<(), AcquisitionError> {
        unreachable!("wait_for after failed load")
    }

    async fn snapshot(&mut self) -> Result<String, AcquisitionError> {
        unreachable!("snapshot after failed load")
    }

    async fn close(&mut self) -> Result<(), AcquisitionError> {
        self.closes += 1;
        Ok(())
    }
}

#[tokio::test]
async fn navigation_failure_closes_once() {
    let dir = TempDir::new().unwrap();
    let mut acquirer = BrokenBrowser::default();

    let outcome = pipeline(dir.path()).run(&mut acquirer, "tee").await;

    match outcome {
        RunOutcome::NoResults { reason } => assert!(reason.contains("connection refused")),
        other => panic!("expected NoResults, got {other:?}"),
    }
    assert_eq!(acquirer.closes, 1);
}
