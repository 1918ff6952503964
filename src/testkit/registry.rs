//! In-memory subscriber registry.

use std::collections::BTreeSet;

use parking_lot::Mutex;

use crate::domain::id::SubscriberId;
use crate::error::RegistryError;
use crate::port::outbound::registry::SubscriberRegistry;

#[derive(Debug, Default)]
pub struct MemoryRegistry {
    subscribers: Mutex<BTreeSet<SubscriberId>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscribers(ids: impl IntoIterator<Item = SubscriberId>) -> Self {
        Self {
            subscribers: Mutex::new(ids.into_iter().collect()),
        }
    }
}

impl SubscriberRegistry for MemoryRegistry {
    fn add(&self, id: SubscriberId) -> Result<bool, RegistryError> {
        Ok(self.subscribers.lock().insert(id))
    }

    fn remove(&self, id: SubscriberId) -> Result<bool, RegistryError> {
        Ok(self.subscribers.lock().remove(&id))
    }

    fn all(&self) -> Vec<SubscriberId> {
        self.subscribers.lock().iter().copied().collect()
    }
}
