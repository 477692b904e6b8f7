//! One search run: acquire, parse, extract, merge, release.
use cartscout_common::{CartscoutError, ExtractionBatch};
use cartscout_drivers::PageAcquirer;
use cartscout_extract::{ParsedTree, SiteAdapter};
use cartscout_store::{MergeReport, ResultStore};
use std::fmt;
use std::time::Duration;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

/// How a run ended. None of these are fatal to the process.
#[derive(Debug)]
pub enum RunOutcome {
    Stored(MergeReport),
    /// The page never showed results or nothing trustworthy could be read.
    NoResults { reason: String },
    /// Results were extracted but could not be written.
    NotPersisted { found: usize, error: CartscoutError },
}

impl RunOutcome {
    pub fn no_results(reason: impl fmt::Display) -> Self {
        RunOutcome::NoResults {
            reason: reason.to_string(),
        }
    }
}

pub struct Pipeline {
    adapter: SiteAdapter,
    store: ResultStore,
    wait_timeout: Duration,
}

impl Pipeline {
    pub fn new(adapter: SiteAdapter, store: ResultStore, wait_timeout: Duration) -> Self {
        Self {
            adapter,
            store,
            wait_timeout,
        }
    }

    /// Run `query` through `acquirer`, which is closed before this returns.
    pub async fn run<A>(&self, acquirer: &mut A, query: &str) -> RunOutcome
    where
        A: PageAcquirer + ?Sized,
    {
        let site = self.adapter.site();
        let span = info_span!("run", run_id = %Uuid::new_v4(), %site);
        async move {
            info!(target: "pipeline", query, "run started");
            let fetched = self.fetch(acquirer, query).await;
            if let Err(err) = acquirer.close().await {
                warn!(target: "pipeline", error = %err, "acquirer did not close cleanly");
            }

            let batch = match fetched.and_then(|markup| self.extract(&markup)) {
                Ok(batch) => batch,
                Err(err) => return settle(err, 0),
            };

            match self
                .store
                .merge(site.name(), self.adapter.currency(), &batch)
            {
                Ok(report) => RunOutcome::Stored(report),
                Err(err) => settle(err.into(), batch.len()),
            }
        }
        .instrument(span)
        .await
    }

    async fn fetch<A>(&self, acquirer: &mut A, query: &str) -> cartscout_common::Result<String>
    where
        A: PageAcquirer + ?Sized,
    {
        let url = self.adapter.search_url(query);
        acquirer.load(&url).await?;
        acquirer
            .wait_for(self.adapter.presence_selector(), self.wait_timeout)
            .await?;
        Ok(acquirer.snapshot().await?)
    }

    /// Parsing stays synchronous: the tree never lives across an await.
    fn extract(&self, markup: &str) -> cartscout_common::Result<ExtractionBatch> {
        let tree = ParsedTree::parse(markup);
        Ok(self.adapter.extract(&tree)?)
    }
}

/// Map a failed run onto its outcome; `found` is how many products were extracted.
fn settle(err: CartscoutError, found: usize) -> RunOutcome {
    if err.is_no_results() {
        info!(target: "pipeline.no_results", error = %err, "no valid results");
        RunOutcome::no_results(err)
    } else {
        error!(target: "pipeline.store", error = %err, "results were not persisted");
        RunOutcome::NotPersisted { found, error: err }
    }
}
