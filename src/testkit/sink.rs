//! Recording notification sink.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::id::SubscriberId;
use crate::error::DeliveryError;
use crate::port::outbound::notifier::NotificationSink;

/// Records every successful send; fails or stalls for configured subscribers.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(SubscriberId, String)>>,
    failures: HashMap<SubscriberId, DeliveryError>,
    delays: HashMap<SubscriberId, Duration>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send to `subscriber` fails with `error`.
    pub fn with_failure(mut self, subscriber: SubscriberId, error: DeliveryError) -> Self {
        self.failures.insert(subscriber, error);
        self
    }

    /// Every send to `subscriber` takes `delay` before completing.
    pub fn with_delay(mut self, subscriber: SubscriberId, delay: Duration) -> Self {
        self.delays.insert(subscriber, delay);
        self
    }

    pub fn sent(&self) -> Vec<(SubscriberId, String)> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, subscriber: SubscriberId) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|(id, _)| *id == subscriber)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn total_sent(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, subscriber: SubscriberId, text: &str) -> Result<(), DeliveryError> {
        if let Some(delay) = self.delays.get(&subscriber) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(error) = self.failures.get(&subscriber) {
            return Err(error.clone());
        }
        self.sent.lock().push((subscriber, text.to_string()));
        Ok(())
    }
}
