//! Polling loop: acquire snapshots, detect changes, broadcast alerts.
//!
//! Each cycle moves `Idle → Polling → (RateLimited | Evaluating) → Idle`:
//!
//! - one batched price request for the whole universe
//! - on a rate limit the loop sleeps for the requested delay instead of the
//!   normal interval, with no evaluation in between
//! - on any other source error the cycle is empty and nothing is mutated
//! - otherwise every symbol is evaluated, due open interest / funding
//!   readings are refreshed under a concurrency bound, and each alert is
//!   formatted and broadcast
//!
//! Shutdown is observed only between cycles, so an in-flight cycle always
//! completes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::detector::engine::ChangeDetector;
use super::dispatch::{prune_unreachable, AlertDelivery};
use super::format::format_alert;
use super::store::SymbolStateStore;
use crate::domain::alert::Alert;
use crate::domain::metric::{FundingReading, OpenInterestReading, Snapshot};
use crate::error::SourceError;
use crate::port::outbound::clock::Clock;
use crate::port::outbound::registry::SubscriberRegistry;
use crate::port::outbound::source::MetricSource;

/// Loop timing and request bounds.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Sleep between cycles.
    pub check_interval: Duration,
    /// How often the observational summary is logged.
    pub summary_interval: Duration,
    /// Upper bound on in-flight per-symbol requests.
    pub max_concurrent_requests: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_millis(500),
            summary_interval: Duration::from_secs(30),
            max_concurrent_requests: 8,
        }
    }
}

/// Result of a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Prices were evaluated.
    Evaluated { symbols: usize, alerts: usize },
    /// The price request failed; nothing was evaluated.
    SourceUnavailable,
    /// The source asked us to back off; the whole loop pauses this long.
    RateLimited(Duration),
}

/// Counters reported by the periodic summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub requests: u64,
    pub cycles: u64,
    pub alerts: u64,
    pub tracked_symbols: usize,
    pub subscribers: usize,
}

#[derive(Debug, Default)]
struct PollStats {
    requests: AtomicU64,
    cycles: AtomicU64,
    alerts: AtomicU64,
}

enum Fetch {
    OpenInterest(String),
    Funding(String),
}

enum Fetched {
    OpenInterest(String, Result<OpenInterestReading, SourceError>),
    Funding(String, Result<FundingReading, SourceError>),
}

#[derive(Default)]
struct Enrichment {
    alerts: Vec<Alert>,
    retry_after: Option<Duration>,
}

pub struct Poller {
    source: Arc<dyn MetricSource>,
    detector: ChangeDetector,
    store: SymbolStateStore,
    delivery: AlertDelivery,
    registry: Arc<dyn SubscriberRegistry>,
    clock: Arc<dyn Clock>,
    config: PollerConfig,
    stats: PollStats,
}

impl Poller {
    pub fn new(
        source: Arc<dyn MetricSource>,
        detector: ChangeDetector,
        delivery: AlertDelivery,
        registry: Arc<dyn SubscriberRegistry>,
        clock: Arc<dyn Clock>,
        config: PollerConfig,
    ) -> Self {
        Self {
            source,
            detector,
            store: SymbolStateStore::new(),
            delivery,
            registry,
            clock,
            config,
            stats: PollStats::default(),
        }
    }

    /// Per-symbol state, for inspection.
    #[must_use]
    pub fn store(&self) -> &SymbolStateStore {
        &self.store
    }

    #[must_use]
    pub fn summary(&self) -> PollSummary {
        PollSummary {
            requests: self.stats.requests.load(Ordering::Relaxed),
            cycles: self.stats.cycles.load(Ordering::Relaxed),
            alerts: self.stats.alerts.load(Ordering::Relaxed),
            tracked_symbols: self.store.len(),
            subscribers: self.registry.len(),
        }
    }

    /// Run cycles until `shutdown` flips to `true` (or its sender is dropped).
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            check_interval_ms = self.config.check_interval.as_millis() as u64,
            "Polling loop started"
        );
        let mut last_summary = Instant::now();

        loop {
            if *shutdown.borrow() {
                break;
            }

            let pause = match self.poll_once().await {
                CycleOutcome::RateLimited(retry_after) => {
                    warn!(
                        retry_after_secs = retry_after.as_secs(),
                        "Rate limited, pausing polling"
                    );
                    retry_after
                }
                _ => self.config.check_interval,
            };

            if last_summary.elapsed() >= self.config.summary_interval {
                self.log_summary();
                last_summary = Instant::now();
            }

            tokio::select! {
                () = tokio::time::sleep(pause) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Polling loop stopped");
    }

    /// Execute one full cycle.
    pub async fn poll_once(&self) -> CycleOutcome {
        self.stats.cycles.fetch_add(1, Ordering::Relaxed);
        self.stats.requests.fetch_add(1, Ordering::Relaxed);

        let prices = match self.source.fetch_all_prices().await {
            Ok(prices) => prices,
            Err(SourceError::RateLimited { retry_after }) => {
                return CycleOutcome::RateLimited(retry_after);
            }
            Err(e) => {
                warn!(error = %e, "Price fetch failed, skipping cycle");
                return CycleOutcome::SourceUnavailable;
            }
        };

        let now = self.clock.now();
        let mut alerts = self.evaluate_prices(&prices, now);

        let enrichment = self.refresh_enrichment(&prices, now).await;
        alerts.extend(enrichment.alerts);

        let alert_count = alerts.len();
        self.dispatch(alerts).await;

        match enrichment.retry_after {
            Some(retry_after) => CycleOutcome::RateLimited(retry_after),
            None => CycleOutcome::Evaluated {
                symbols: prices.len(),
                alerts: alert_count,
            },
        }
    }

    fn evaluate_prices(&self, prices: &HashMap<String, f64>, now: DateTime<Utc>) -> Vec<Alert> {
        let mut alerts = Vec::new();
        for (symbol, price) in prices {
            let snapshot = Snapshot::new(symbol.clone(), *price, now);
            let fired = self
                .store
                .with_state(symbol, now, |state| self.detector.evaluate(&snapshot, state));
            alerts.extend(fired);
        }
        alerts
    }

    /// Fetch open interest and funding for symbols whose cadence has elapsed.
    ///
    /// A failed fetch leaves that symbol's state untouched; it becomes due
    /// again on a later cycle.
    async fn refresh_enrichment(
        &self,
        prices: &HashMap<String, f64>,
        now: DateTime<Utc>,
    ) -> Enrichment {
        let mut due = Vec::new();
        for symbol in prices.keys() {
            let (oi_due, funding_due) = self
                .store
                .update_existing(symbol, |state| {
                    (
                        self.detector.open_interest_due(state, now),
                        self.detector.funding_due(state, now),
                    )
                })
                .unwrap_or((false, false));
            if oi_due {
                due.push(Fetch::OpenInterest(symbol.clone()));
            }
            if funding_due {
                due.push(Fetch::Funding(symbol.clone()));
            }
        }

        if due.is_empty() {
            return Enrichment::default();
        }

        self.stats
            .requests
            .fetch_add(due.len() as u64, Ordering::Relaxed);

        let source = &self.source;
        let fetched: Vec<Fetched> = stream::iter(due)
            .map(|fetch| async move {
                match fetch {
                    Fetch::OpenInterest(symbol) => {
                        let result = source.fetch_open_interest(&symbol).await;
                        Fetched::OpenInterest(symbol, result)
                    }
                    Fetch::Funding(symbol) => {
                        let result = source.fetch_funding_rate(&symbol).await;
                        Fetched::Funding(symbol, result)
                    }
                }
            })
            .buffer_unordered(self.config.max_concurrent_requests.max(1))
            .collect()
            .await;

        let mut enrichment = Enrichment::default();
        for item in fetched {
            match item {
                Fetched::OpenInterest(symbol, Ok(reading)) => {
                    let alert = self
                        .store
                        .update_existing(&symbol, |state| {
                            self.detector.evaluate_oi(&reading, state, now)
                        })
                        .flatten();
                    enrichment.alerts.extend(alert);
                }
                Fetched::Funding(symbol, Ok(reading)) => {
                    self.store.update_existing(&symbol, |state| {
                        self.detector.record_funding(&reading, state, now);
                    });
                }
                Fetched::OpenInterest(symbol, Err(e)) | Fetched::Funding(symbol, Err(e)) => {
                    if let Some(retry_after) = e.retry_after() {
                        enrichment.retry_after = Some(
                            enrichment
                                .retry_after
                                .map_or(retry_after, |current| current.max(retry_after)),
                        );
                    } else {
                        debug!(symbol = %symbol, error = %e, "Per-symbol fetch failed");
                    }
                }
            }
        }
        enrichment
    }

    async fn dispatch(&self, alerts: Vec<Alert>) {
        if alerts.is_empty() {
            return;
        }

        let mut subscribers = match self.delivery {
            AlertDelivery::Broadcast(_) => self.registry.all(),
            AlertDelivery::LogOnly => Vec::new(),
        };
        for alert in alerts {
            info!(
                symbol = %alert.condition.symbol(),
                kind = %alert.condition.kind(),
                change_pct = alert.condition.change_pct(),
                "Alert detected"
            );
            self.stats.alerts.fetch_add(1, Ordering::Relaxed);

            let text = format_alert(&alert.condition, &alert.context);
            let dispatcher = match &self.delivery {
                AlertDelivery::Broadcast(dispatcher) => dispatcher,
                AlertDelivery::LogOnly => {
                    info!(symbol = %alert.condition.symbol(), text = %text, "Alert");
                    continue;
                }
            };

            if subscribers.is_empty() {
                debug!("No subscribers, alert not delivered");
                continue;
            }

            let report = dispatcher.broadcast(&text, &subscribers).await;

            if !report.unreachable.is_empty() {
                prune_unreachable(&report, self.registry.as_ref());
                subscribers.retain(|s| !report.unreachable.contains(s));
            }
        }
    }

    fn log_summary(&self) {
        let summary = self.summary();
        info!(
            requests = summary.requests,
            cycles = summary.cycles,
            alerts = summary.alerts,
            tracked_symbols = summary.tracked_symbols,
            subscribers = summary.subscribers,
            "Polling summary"
        );
    }
}
