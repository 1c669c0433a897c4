//! Crawl orchestration: authenticate → search → enumerate → extract →
//! aggregate.
//!
//! Sequential mode drives every item through one exclusively owned session.
//! Pooled mode partitions positions across a fixed worker pool; workers own
//! independent sessions and coordinate only through a shared work queue and a
//! results channel; the one page handle is never shared across workers.
//! Either way, item failures skip and continue; only authentication, search
//! navigation, and listing discovery are fatal.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use chromiumoxide::page::Page;

use crate::config::CrawlConfig;
use crate::credentials::CredentialSet;
use crate::detail::DetailExtractor;
use crate::error::{CrawlError, CrawlResult};
use crate::listing;
use crate::progress::{LISTING_ENUMERATED, ProgressReporter, SEARCH_ISSUED, item_fraction};
use crate::records::{OptionRecord, ResultTable};
use crate::session::authenticate;

/// Drives one crawl from configuration to result table.
pub struct CrawlOrchestrator {
    config: Arc<CrawlConfig>,
    credentials: Arc<CredentialSet>,
}

impl CrawlOrchestrator {
    pub fn new(config: CrawlConfig, credentials: CredentialSet) -> Self {
        Self {
            config: Arc::new(config),
            credentials: Arc::new(credentials),
        }
    }

    /// Run the crawl to completion and return the aggregated table.
    ///
    /// Partial results always survive: item failures are logged and skipped,
    /// and an empty table is a normal outcome distinct from a fatal error.
    pub async fn run(&self, progress: &dyn ProgressReporter) -> CrawlResult<ResultTable> {
        if self.config.workers() > 1 {
            self.run_pooled(progress).await
        } else {
            self.run_sequential(progress).await
        }
    }

    async fn run_sequential(&self, progress: &dyn ProgressReporter) -> CrawlResult<ResultTable> {
        let session = authenticate(&self.config, &self.credentials).await?;
        let outcome = self.crawl_with_page(session.page(), progress).await;
        session.shutdown().await;
        outcome
    }

    async fn crawl_with_page(
        &self,
        page: &Page,
        progress: &dyn ProgressReporter,
    ) -> CrawlResult<ResultTable> {
        listing::search(page, &self.config).await?;
        progress.report_progress(SEARCH_ISSUED);
        listing::scroll_to_load_all(page, &self.config).await;
        let index = listing::enumerate(page, &self.config, progress).await?;
        progress.report_progress(LISTING_ENUMERATED);

        let total = index.len();
        let mut table = ResultTable::new();
        if total == 0 {
            info!("no usable results for '{}'", self.config.keyword());
            progress.report_progress(1.0);
            return Ok(table);
        }

        let extractor = DetailExtractor::new(page, &self.config);
        for (done, &position) in index.positions().iter().enumerate() {
            info!("processing item {position} ({}/{total})", done + 1);
            match extractor.extract(position).await {
                Ok(records) => table.extend_from_item(records),
                Err(e) => {
                    warn!("item {position} failed, skipping: {e:#}");
                    extractor.recover_listing().await;
                }
            }
            progress.report_progress(item_fraction(done + 1, total));
        }

        info!("collected {} option rows from {total} items", table.len());
        progress.report_progress(1.0);
        Ok(table)
    }

    async fn run_pooled(&self, progress: &dyn ProgressReporter) -> CrawlResult<ResultTable> {
        // The primary session materializes the listing once, to enumerate.
        let primary = authenticate(&self.config, &self.credentials).await?;
        let enumerated = async {
            listing::search(primary.page(), &self.config).await?;
            progress.report_progress(SEARCH_ISSUED);
            listing::scroll_to_load_all(primary.page(), &self.config).await;
            listing::enumerate(primary.page(), &self.config, progress).await
        }
        .await;
        primary.shutdown().await;
        let index = enumerated?;
        progress.report_progress(LISTING_ENUMERATED);

        let total = index.len();
        let mut table = ResultTable::new();
        if total == 0 {
            info!("no usable results for '{}'", self.config.keyword());
            progress.report_progress(1.0);
            return Ok(table);
        }

        let queue: Arc<Mutex<VecDeque<usize>>> =
            Arc::new(Mutex::new(index.positions().iter().copied().collect()));
        let completed = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<OptionRecord>>();

        let worker_count = self.config.workers().min(total);
        info!("starting {worker_count} crawl workers for {total} items");
        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let config = Arc::clone(&self.config);
            let credentials = Arc::clone(&self.credentials);
            let queue = Arc::clone(&queue);
            let completed = Arc::clone(&completed);
            let tx = tx.clone();
            handles.push(tokio::spawn(async move {
                worker_loop(worker_id, config, credentials, queue, completed, tx).await;
            }));
        }
        drop(tx);

        // Rows land in worker-completion order; membership, not ordering, is
        // the guarantee here.
        while let Some(records) = rx.recv().await {
            table.extend_from_item(records);
            progress.report_progress(item_fraction(completed.load(Ordering::Relaxed), total));
        }
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("worker task panicked: {e}");
            }
        }

        info!("collected {} option rows from {total} items", table.len());
        progress.report_progress(1.0);
        Ok(table)
    }
}

/// One pooled worker: own session, own listing view, items pulled from the
/// shared queue until it drains.
///
/// A worker that cannot establish its session or listing exits early; the
/// remaining workers absorb its share of the queue.
async fn worker_loop(
    worker_id: usize,
    config: Arc<CrawlConfig>,
    credentials: Arc<CredentialSet>,
    queue: Arc<Mutex<VecDeque<usize>>>,
    completed: Arc<AtomicUsize>,
    tx: mpsc::UnboundedSender<Vec<OptionRecord>>,
) {
    let session = match authenticate(&config, &credentials).await {
        Ok(session) => session,
        Err(e) => {
            warn!("worker {worker_id}: could not establish session: {e}");
            return;
        }
    };

    let ready = async {
        listing::search(session.page(), &config).await?;
        listing::scroll_to_load_all(session.page(), &config).await;
        Ok::<(), CrawlError>(())
    }
    .await;
    if let Err(e) = ready {
        warn!("worker {worker_id}: could not materialize the listing: {e}");
        session.shutdown().await;
        return;
    }

    let extractor = DetailExtractor::new(session.page(), &config);
    loop {
        let position = { queue.lock().await.pop_front() };
        let Some(position) = position else { break };
        debug!("worker {worker_id}: processing item {position}");
        let records = match extractor.extract(position).await {
            Ok(records) => records,
            Err(e) => {
                warn!("worker {worker_id}: item {position} failed, skipping: {e:#}");
                extractor.recover_listing().await;
                Vec::new()
            }
        };
        completed.fetch_add(1, Ordering::Relaxed);
        // An empty batch still ticks progress at the aggregator.
        if tx.send(records).is_err() {
            break;
        }
    }

    session.shutdown().await;
}
