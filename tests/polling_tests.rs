use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;

use tickwatch::application::detector::config::DetectorConfig;
use tickwatch::application::detector::engine::ChangeDetector;
use tickwatch::application::dispatch::{AlertDelivery, BroadcastDispatcher, DispatchConfig};
use tickwatch::application::poller::{CycleOutcome, Poller, PollerConfig};
use tickwatch::domain::id::SubscriberId;
use tickwatch::domain::metric::{FundingReading, OpenInterestReading};
use tickwatch::error::{DeliveryError, SourceError};
use tickwatch::port::outbound::registry::SubscriberRegistry;
use tickwatch::port::outbound::source::MetricSource;
use tickwatch::testkit::clock::ManualClock;
use tickwatch::testkit::registry::MemoryRegistry;
use tickwatch::testkit::sink::RecordingSink;
use tickwatch::testkit::source::ScriptedSource;

struct Harness {
    source: Arc<ScriptedSource>,
    sink: Arc<RecordingSink>,
    registry: Arc<MemoryRegistry>,
    clock: ManualClock,
    poller: Arc<Poller>,
}

impl Harness {
    fn new(subscribers: &[i64]) -> Self {
        Self::with_sink(subscribers, RecordingSink::new())
    }

    fn with_sink(subscribers: &[i64], sink: RecordingSink) -> Self {
        let source = Arc::new(ScriptedSource::new());
        let sink = Arc::new(sink);
        let registry = Arc::new(MemoryRegistry::with_subscribers(
            subscribers.iter().copied().map(SubscriberId::new),
        ));
        let clock = ManualClock::at_epoch();

        let poller = Poller::new(
            source.clone(),
            ChangeDetector::new(DetectorConfig::default()),
            AlertDelivery::Broadcast(BroadcastDispatcher::new(
                sink.clone(),
                DispatchConfig::default(),
            )),
            registry.clone(),
            Arc::new(clock.clone()),
            PollerConfig::default(),
        );

        Self {
            source,
            sink,
            registry,
            clock,
            poller: Arc::new(poller),
        }
    }
}

#[tokio::test]
async fn first_observation_sets_baseline_without_alert() {
    let h = Harness::new(&[1]);
    h.source.push_prices(&[("BTCUSDT", 100.0), ("ETHUSDT", 2000.0)]);

    let outcome = h.poller.poll_once().await;

    assert_eq!(
        outcome,
        CycleOutcome::Evaluated {
            symbols: 2,
            alerts: 0
        }
    );
    assert_eq!(h.sink.total_sent(), 0);
    let state = h.poller.store().get("BTCUSDT").unwrap();
    assert_eq!(state.last_price, Some(100.0));
    assert_eq!(state.accumulated_change_pct, 0.0);
}

#[tokio::test]
async fn instant_move_is_broadcast_to_every_subscriber() {
    let h = Harness::new(&[1, 2]);
    h.source.push_prices(&[("BTCUSDT", 100.0)]);
    h.source.push_prices(&[("BTCUSDT", 103.5)]);

    h.poller.poll_once().await;
    h.clock.advance(Duration::from_secs(5));
    let outcome = h.poller.poll_once().await;

    assert_eq!(
        outcome,
        CycleOutcome::Evaluated {
            symbols: 1,
            alerts: 1
        }
    );
    let expected = "🟢 BTCUSDT +3.50% Binance\nInstant price move\n⚡ FAST 5s";
    assert_eq!(h.sink.sent_to(SubscriberId::new(1)), vec![expected]);
    assert_eq!(h.sink.sent_to(SubscriberId::new(2)), vec![expected]);
}

#[tokio::test]
async fn instant_drop_is_reported_negative() {
    let h = Harness::new(&[1]);
    h.source.push_prices(&[("SOLUSDT", 100.0)]);
    h.source.push_prices(&[("SOLUSDT", 97.0)]);

    h.poller.poll_once().await;
    h.clock.advance(Duration::from_secs(30));
    h.poller.poll_once().await;

    let sent = h.sink.sent_to(SubscriberId::new(1));
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("🔴 SOLUSDT -3.00% Binance\n"), "{}", sent[0]);
    assert!(sent[0].contains("🏃 NORMAL 30s"));
}

#[tokio::test]
async fn open_interest_growth_alert_carries_context() {
    let h = Harness::new(&[1]);
    h.source.push_prices(&[("BTCUSDT", 100.0)]);
    h.source.push_prices(&[("BTCUSDT", 100.0)]);
    h.source.push_open_interest("BTCUSDT", Ok(1_000_000.0));
    h.source.push_open_interest("BTCUSDT", Ok(1_060_000.0));
    h.source.push_funding("BTCUSDT", Ok(0.01));

    h.poller.poll_once().await;
    assert_eq!(h.sink.total_sent(), 0);

    h.clock.advance(Duration::from_secs(10));
    let outcome = h.poller.poll_once().await;

    assert_eq!(
        outcome,
        CycleOutcome::Evaluated {
            symbols: 1,
            alerts: 1
        }
    );
    let sent = h.sink.sent_to(SubscriberId::new(1));
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("🟢 BTCUSDT +6.00% Binance\nOpen interest growth\n"));
    assert!(sent[0].contains("OI: 1.06M"));
    assert!(sent[0].contains("Funding: +0.0100%"));

    assert_eq!(h.source.oi_calls(), 2);
    assert_eq!(h.source.funding_calls(), 1);
}

#[tokio::test]
async fn failed_price_fetch_leaves_state_untouched() {
    let h = Harness::new(&[1]);
    h.source.push_prices(&[("BTCUSDT", 100.0)]);
    h.source
        .push_price_error(SourceError::Unavailable("connection reset".into()));
    h.source.push_prices(&[("BTCUSDT", 103.5)]);

    h.poller.poll_once().await;
    let before = h.poller.store().get("BTCUSDT").unwrap();

    assert_eq!(h.poller.poll_once().await, CycleOutcome::SourceUnavailable);
    let after = h.poller.store().get("BTCUSDT").unwrap();
    assert_eq!(before.last_price, after.last_price);
    assert_eq!(before.window_start, after.window_start);

    h.poller.poll_once().await;
    let sent = h.sink.sent_to(SubscriberId::new(1));
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("🟢 BTCUSDT +3.50%"));
}

#[tokio::test]
async fn failed_open_interest_fetch_is_retried_next_cycle() {
    let h = Harness::new(&[1]);
    h.source.push_prices(&[("BTCUSDT", 100.0)]);
    h.source.push_prices(&[("BTCUSDT", 100.0)]);
    h.source.push_open_interest(
        "BTCUSDT",
        Err(SourceError::Unavailable("timeout".into())),
    );
    h.source.push_open_interest("BTCUSDT", Ok(500.0));

    h.poller.poll_once().await;
    assert_eq!(h.poller.store().get("BTCUSDT").unwrap().last_oi_fetch, None);

    h.clock.advance(Duration::from_millis(500));
    h.poller.poll_once().await;
    let state = h.poller.store().get("BTCUSDT").unwrap();
    assert_eq!(state.last_open_interest, Some(500.0));
    assert_eq!(h.source.oi_calls(), 2);
}

#[tokio::test]
async fn permanently_unreachable_subscribers_are_pruned() {
    let sink = RecordingSink::new().with_failure(
        SubscriberId::new(2),
        DeliveryError::PermanentlyUnreachable("bot was blocked by the user".into()),
    );
    let h = Harness::with_sink(&[1, 2, 3], sink);
    h.source.push_prices(&[("BTCUSDT", 100.0)]);
    h.source.push_prices(&[("BTCUSDT", 104.0)]);

    h.poller.poll_once().await;
    h.poller.poll_once().await;

    assert_eq!(
        h.registry.all(),
        vec![SubscriberId::new(1), SubscriberId::new(3)]
    );
    assert_eq!(h.sink.sent_to(SubscriberId::new(1)).len(), 1);
    assert_eq!(h.sink.sent_to(SubscriberId::new(3)).len(), 1);
}

#[tokio::test]
async fn transient_failures_keep_subscriber() {
    let sink = RecordingSink::new().with_failure(
        SubscriberId::new(2),
        DeliveryError::Transient("Too Many Requests".into()),
    );
    let h = Harness::with_sink(&[1, 2], sink);
    h.source.push_prices(&[("BTCUSDT", 100.0)]);
    h.source.push_prices(&[("BTCUSDT", 104.0)]);

    h.poller.poll_once().await;
    h.poller.poll_once().await;

    assert_eq!(h.registry.len(), 2);
}

#[tokio::test]
async fn alerts_without_subscribers_are_counted_not_sent() {
    let h = Harness::new(&[]);
    h.source.push_prices(&[("BTCUSDT", 100.0)]);
    h.source.push_prices(&[("BTCUSDT", 110.0)]);

    h.poller.poll_once().await;
    h.poller.poll_once().await;

    assert_eq!(h.sink.total_sent(), 0);
    assert_eq!(h.poller.summary().alerts, 2);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_pauses_the_whole_loop() {
    let h = Harness::new(&[1]);
    h.source.push_price_error(SourceError::RateLimited {
        retry_after: Duration::from_secs(60),
    });
    h.source.push_prices(&[("BTCUSDT", 100.0)]);

    let (tx, rx) = watch::channel(false);
    let poller = h.poller.clone();
    let handle = tokio::spawn(async move { poller.run(rx).await });

    tokio::time::sleep(Duration::from_millis(60_750)).await;
    tx.send(true).unwrap();
    handle.await.unwrap();

    let calls = h.source.price_calls();
    assert!(calls.len() >= 3, "calls: {}", calls.len());
    assert_eq!(calls[1] - calls[0], Duration::from_secs(60));
    assert_eq!(calls[2] - calls[1], Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn per_symbol_rate_limit_also_pauses() {
    let h = Harness::new(&[1]);
    h.source.push_prices(&[("BTCUSDT", 100.0)]);
    h.source.push_open_interest(
        "BTCUSDT",
        Err(SourceError::RateLimited {
            retry_after: Duration::from_secs(30),
        }),
    );

    let (tx, rx) = watch::channel(false);
    let poller = h.poller.clone();
    let handle = tokio::spawn(async move { poller.run(rx).await });

    tokio::time::sleep(Duration::from_millis(30_100)).await;
    tx.send(true).unwrap();
    handle.await.unwrap();

    let calls = h.source.price_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1] - calls[0], Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn shutdown_lets_in_flight_cycle_finish() {
    let sink = RecordingSink::new().with_delay(SubscriberId::new(1), Duration::from_secs(5));
    let h = Harness::with_sink(&[1], sink);
    h.source.push_prices(&[("BTCUSDT", 100.0)]);
    h.source.push_prices(&[("BTCUSDT", 104.0)]);

    let (tx, rx) = watch::channel(false);
    let poller = h.poller.clone();
    let handle = tokio::spawn(async move { poller.run(rx).await });

    // Second cycle starts at 500ms and is stuck in delivery until 5.5s.
    tokio::time::sleep(Duration::from_secs(1)).await;
    tx.send(true).unwrap();
    handle.await.unwrap();

    assert_eq!(h.source.price_calls().len(), 2);
    assert_eq!(h.sink.sent_to(SubscriberId::new(1)).len(), 1);
}

/// Source whose per-symbol fetches hold a slot open and record the peak.
#[derive(Default)]
struct GaugeSource {
    symbols: usize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    fetches: AtomicUsize,
}

impl GaugeSource {
    async fn hold(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MetricSource for GaugeSource {
    async fn fetch_all_prices(&self) -> Result<HashMap<String, f64>, SourceError> {
        Ok((0..self.symbols)
            .map(|i| (format!("S{i}USDT"), 100.0))
            .collect())
    }

    async fn fetch_open_interest(&self, symbol: &str) -> Result<OpenInterestReading, SourceError> {
        self.hold().await;
        Ok(OpenInterestReading::new(symbol, 1_000_000.0, Utc::now()))
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> Result<FundingReading, SourceError> {
        self.hold().await;
        Ok(FundingReading::new(symbol, 0.01, Utc::now()))
    }
}

#[tokio::test(start_paused = true)]
async fn per_symbol_fetches_respect_the_concurrency_bound() {
    let source = Arc::new(GaugeSource {
        symbols: 50,
        ..GaugeSource::default()
    });
    let poller = Poller::new(
        source.clone(),
        ChangeDetector::new(DetectorConfig::default()),
        AlertDelivery::LogOnly,
        Arc::new(MemoryRegistry::new()),
        Arc::new(ManualClock::at_epoch()),
        PollerConfig {
            max_concurrent_requests: 4,
            ..PollerConfig::default()
        },
    );

    poller.poll_once().await;

    assert_eq!(source.fetches.load(Ordering::SeqCst), 100);
    assert_eq!(source.peak.load(Ordering::SeqCst), 4);
    assert_eq!(poller.store().len(), 50);
}
