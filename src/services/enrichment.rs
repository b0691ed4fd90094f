use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::clients::PageFetcher;
use crate::config::EnrichmentConfig;
use crate::error::{Error, Result};
use crate::extractors::{DetailExtractor, Extractor};
use crate::models::{ListingEntry, item_code_from_url};
use crate::storage::AggregateStore;

/// Fetches one detail page and merges its seller data into the store.
#[derive(Clone)]
pub struct EnrichmentWorker {
    fetcher: Arc<dyn PageFetcher>,
    store: AggregateStore,
}

impl EnrichmentWorker {
    pub fn new(fetcher: Arc<dyn PageFetcher>, store: AggregateStore) -> Self {
        Self { fetcher, store }
    }

    /// Returns the item code that was merged. Fetch failures are returned to
    /// the caller untouched; there is no retry at this level.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn enrich(&self, url: &str) -> Result<String> {
        let item_code =
            item_code_from_url(url).ok_or_else(|| Error::InvalidItemUrl(url.to_string()))?;

        let body = self.fetcher.fetch(url).await?;
        let patch = DetailExtractor.extract(&body);

        debug!(
            item_code = %item_code,
            ratings = patch.ratings.len(),
            "Extracted detail page"
        );

        self.store.upsert_merge(&item_code, patch).await;
        Ok(item_code)
    }
}

/// One unit of enrichment work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentTarget {
    pub item_code: String,
    pub url: String,
}

impl From<&ListingEntry> for EnrichmentTarget {
    fn from(entry: &ListingEntry) -> Self {
        Self {
            item_code: entry.item_code.clone(),
            url: entry.url.clone(),
        }
    }
}

/// How a scheduled batch ended. Anything not counted in `enriched` was left
/// with its listing fields only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub scheduled: usize,
    pub enriched: usize,
    /// (item code, error message)
    pub failed: Vec<(String, String)>,
    pub timed_out: Vec<String>,
    pub cancelled: Vec<String>,
    /// Highest number of workers that were fetching at the same time.
    pub peak_in_flight: usize,
}

impl EnrichmentReport {
    pub fn is_complete(&self) -> bool {
        self.enriched == self.scheduled
    }

    fn record(&mut self, item_code: String, outcome: WorkerOutcome) {
        match outcome {
            WorkerOutcome::Enriched => self.enriched += 1,
            WorkerOutcome::Failed(message) => self.failed.push((item_code, message)),
            WorkerOutcome::TimedOut => self.timed_out.push(item_code),
            WorkerOutcome::Cancelled => self.cancelled.push(item_code),
        }
    }
}

#[derive(Debug)]
enum WorkerOutcome {
    Enriched,
    Failed(String),
    TimedOut,
    Cancelled,
}

/// Tracks how many workers currently hold a permit.
#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Runs one [`EnrichmentWorker`] per target with at most `concurrency`
/// fetching at once. Returns only after every spawned task has finished.
pub struct EnrichmentScheduler {
    worker: EnrichmentWorker,
    concurrency: usize,
    worker_timeout: Duration,
}

impl EnrichmentScheduler {
    pub fn new(worker: EnrichmentWorker, config: &EnrichmentConfig) -> Self {
        Self::with_limits(worker, config.concurrency, config.worker_timeout())
    }

    pub fn with_limits(worker: EnrichmentWorker, concurrency: usize, worker_timeout: Duration) -> Self {
        Self {
            worker,
            concurrency: concurrency.max(1),
            worker_timeout,
        }
    }

    pub async fn run(&self, targets: Vec<EnrichmentTarget>) -> EnrichmentReport {
        self.run_until(targets, std::future::pending()).await
    }

    /// Like [`run`](Self::run), but once `shutdown` resolves no further
    /// workers start: queued targets are reported as cancelled and the ones
    /// already fetching are drained.
    pub async fn run_until<S>(&self, targets: Vec<EnrichmentTarget>, shutdown: S) -> EnrichmentReport
    where
        S: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let in_flight = Arc::new(InFlight::default());
        let mut tasks = JoinSet::new();
        let mut report = EnrichmentReport {
            scheduled: targets.len(),
            ..EnrichmentReport::default()
        };

        info!(
            scheduled = report.scheduled,
            concurrency = self.concurrency,
            worker_timeout_secs = self.worker_timeout.as_secs(),
            "Starting enrichment"
        );

        for target in targets {
            let worker = self.worker.clone();
            let semaphore = semaphore.clone();
            let in_flight = in_flight.clone();
            let worker_timeout = self.worker_timeout;

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (target.item_code, WorkerOutcome::Cancelled);
                };

                in_flight.enter();
                let result = tokio::time::timeout(worker_timeout, worker.enrich(&target.url)).await;
                in_flight.leave();

                let outcome = match result {
                    Ok(Ok(_)) => WorkerOutcome::Enriched,
                    Ok(Err(e)) => WorkerOutcome::Failed(e.to_string()),
                    Err(_) => WorkerOutcome::TimedOut,
                };
                (target.item_code, outcome)
            });
        }

        tokio::pin!(shutdown);
        let mut shutting_down = false;

        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok((item_code, outcome))) => {
                        match &outcome {
                            WorkerOutcome::Failed(message) => warn!(
                                item_code = %item_code,
                                error = %message,
                                "Enrichment failed, keeping listing fields only"
                            ),
                            WorkerOutcome::TimedOut => warn!(
                                item_code = %item_code,
                                timeout_secs = self.worker_timeout.as_secs(),
                                "Enrichment timed out"
                            ),
                            _ => {}
                        }
                        report.record(item_code, outcome);
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Enrichment task aborted");
                        report.failed.push(("task".to_string(), e.to_string()));
                    }
                },
                _ = &mut shutdown, if !shutting_down => {
                    shutting_down = true;
                    semaphore.close();
                    warn!(remaining = tasks.len(), "Shutdown requested, draining in-flight enrichment");
                }
            }
        }

        report.peak_in_flight = in_flight.peak.load(Ordering::SeqCst);

        info!(
            scheduled = report.scheduled,
            enriched = report.enriched,
            failed = report.failed.len(),
            timed_out = report.timed_out.len(),
            cancelled = report.cancelled.len(),
            peak_in_flight = report.peak_in_flight,
            duration_ms = start_time.elapsed().as_millis(),
            "Enrichment completed"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use tokio::sync::Notify;

    const DETAIL: &str = r#"<html><body>
        <h2 class="d-stores-info-categories__container__info__section__title">seller</h2>
        <div class="fdbk-detail-seller-rating__label">Communication</div>
        <span class="fdbk-detail-seller-rating__value">5.0</span>
    </body></html>"#;

    /// Serves `DETAIL` for every url after a short delay, except urls listed
    /// as failing or stalling.
    #[derive(Default)]
    struct FakeFetcher {
        delay: Duration,
        failing: HashSet<String>,
        stalling: HashSet<String>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            if self.stalling.contains(url) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(url) {
                return Err(Error::Status { status: 500, url: url.to_string() });
            }
            Ok(DETAIL.to_string())
        }
    }

    fn targets(n: usize) -> Vec<EnrichmentTarget> {
        (0..n)
            .map(|i| EnrichmentTarget {
                item_code: format!("{i}"),
                url: format!("https://www.ebay.com/itm/{i}?hash=h"),
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn bounded_pool_enriches_every_item() {
        let fetcher = Arc::new(FakeFetcher {
            delay: Duration::from_millis(20),
            ..Default::default()
        });
        let store = AggregateStore::new();
        let worker = EnrichmentWorker::new(fetcher.clone(), store.clone());
        let scheduler = EnrichmentScheduler::with_limits(worker, 3, Duration::from_secs(5));

        let report = scheduler.run(targets(12)).await;

        assert!(report.is_complete());
        assert_eq!(report.enriched, 12);
        assert_eq!(store.enriched_count().await, 12);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 12);
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 3);
        assert!(report.peak_in_flight <= 3);
    }

    #[tokio::test]
    async fn failures_are_contained_per_item() {
        let fetcher = Arc::new(FakeFetcher {
            failing: HashSet::from(["https://www.ebay.com/itm/1?hash=h".to_string()]),
            ..Default::default()
        });
        let store = AggregateStore::new();
        let worker = EnrichmentWorker::new(fetcher, store.clone());
        let scheduler = EnrichmentScheduler::with_limits(worker, 2, Duration::from_secs(5));

        let report = scheduler.run(targets(4)).await;

        assert_eq!(report.enriched, 3);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "1");
        assert!(!report.is_complete());
        assert!(store.get("1").await.is_none());
        assert_eq!(store.enriched_count().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_worker_times_out_without_blocking_the_batch() {
        let fetcher = Arc::new(FakeFetcher {
            stalling: HashSet::from(["https://www.ebay.com/itm/2?hash=h".to_string()]),
            ..Default::default()
        });
        let store = AggregateStore::new();
        let worker = EnrichmentWorker::new(fetcher, store.clone());
        let scheduler = EnrichmentScheduler::with_limits(worker, 2, Duration::from_secs(10));

        let report = scheduler.run(targets(5)).await;

        assert_eq!(report.enriched, 4);
        assert_eq!(report.timed_out, vec!["2".to_string()]);
        assert_eq!(store.enriched_count().await, 4);
    }

    #[tokio::test]
    async fn url_without_item_code_fails_that_worker() {
        let store = AggregateStore::new();
        let worker = EnrichmentWorker::new(Arc::new(FakeFetcher::default()), store);
        let err = worker.enrich("https://www.ebay.com/sch/i.html").await.unwrap_err();
        assert!(matches!(err, Error::InvalidItemUrl(_)));
    }

    #[tokio::test]
    async fn shutdown_cancels_queued_work_and_drains_the_rest() {
        let fetcher = Arc::new(FakeFetcher {
            delay: Duration::from_millis(200),
            ..Default::default()
        });
        let store = AggregateStore::new();
        let worker = EnrichmentWorker::new(fetcher.clone(), store.clone());
        let scheduler = EnrichmentScheduler::with_limits(worker, 1, Duration::from_secs(5));

        let stop = Arc::new(Notify::new());
        let trigger = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.notify_one();
        });

        let report = scheduler
            .run_until(targets(4), async move { stop.notified().await })
            .await;

        assert_eq!(report.scheduled, 4);
        assert_eq!(report.enriched, 1);
        assert_eq!(report.cancelled.len(), 3);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.enriched_count().await, 1);
    }
}
