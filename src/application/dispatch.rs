//! Broadcast of rendered alerts to all subscribers.
//!
//! Every subscriber is attempted independently: one failure never aborts
//! delivery to the rest. Sends run concurrently up to a bound, each under
//! its own timeout, and the outcome is aggregated only after all attempts
//! finish.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::domain::id::SubscriberId;
use crate::error::DeliveryError;
use crate::port::outbound::notifier::NotificationSink;
use crate::port::outbound::registry::SubscriberRegistry;

/// Outcome of one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: Vec<SubscriberId>,
    /// Recipients that are gone for good; callers should remove them.
    pub unreachable: Vec<SubscriberId>,
    /// Failed this time; kept.
    pub transient: Vec<SubscriberId>,
}

impl DeliveryReport {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.unreachable.len() + self.transient.len()
    }
}

/// Tunables for [`BroadcastDispatcher`].
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub send_timeout: Duration,
    pub max_concurrent_sends: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_secs(10),
            max_concurrent_sends: 16,
        }
    }
}

pub struct BroadcastDispatcher {
    sink: Arc<dyn NotificationSink>,
    config: DispatchConfig,
}

impl BroadcastDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>, config: DispatchConfig) -> Self {
        Self { sink, config }
    }

    /// Send `text` to every subscriber and classify the results.
    pub async fn broadcast(&self, text: &str, subscribers: &[SubscriberId]) -> DeliveryReport {
        let timeout = self.config.send_timeout;
        let sink = &self.sink;

        let outcomes: Vec<(SubscriberId, Result<(), DeliveryError>)> =
            stream::iter(subscribers.iter().copied())
                .map(|subscriber| async move {
                    let result = match tokio::time::timeout(timeout, sink.send(subscriber, text))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(DeliveryError::Transient(format!(
                            "send timed out after {}ms",
                            timeout.as_millis()
                        ))),
                    };
                    (subscriber, result)
                })
                .buffer_unordered(self.config.max_concurrent_sends.max(1))
                .collect()
                .await;

        let mut report = DeliveryReport::default();
        for (subscriber, result) in outcomes {
            match result {
                Ok(()) => report.delivered.push(subscriber),
                Err(DeliveryError::PermanentlyUnreachable(reason)) => {
                    info!(subscriber = %subscriber, reason = %reason, "Subscriber unreachable");
                    report.unreachable.push(subscriber);
                }
                Err(DeliveryError::Transient(reason)) => {
                    warn!(subscriber = %subscriber, reason = %reason, "Delivery failed");
                    report.transient.push(subscriber);
                }
            }
        }

        debug!(
            delivered = report.delivered.len(),
            unreachable = report.unreachable.len(),
            transient = report.transient.len(),
            "Broadcast complete"
        );
        report
    }
}

/// Where detected alerts go.
pub enum AlertDelivery {
    /// Broadcast to every registered subscriber.
    Broadcast(BroadcastDispatcher),
    /// Write the rendered text to the log. The registry is never consulted.
    LogOnly,
}

/// Remove every permanently unreachable subscriber in `report` from `registry`.
///
/// Returns the number actually removed. Registry write failures are logged
/// and do not stop the remaining removals.
pub fn prune_unreachable(report: &DeliveryReport, registry: &dyn SubscriberRegistry) -> usize {
    let mut removed = 0;
    for subscriber in &report.unreachable {
        match registry.remove(*subscriber) {
            Ok(true) => {
                info!(subscriber = %subscriber, "Removed unreachable subscriber");
                removed += 1;
            }
            Ok(false) => {}
            Err(e) => warn!(subscriber = %subscriber, error = %e, "Failed to remove subscriber"),
        }
    }
    removed
}
