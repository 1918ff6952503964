//! Subscriber registry port.

use crate::domain::id::SubscriberId;
use crate::error::RegistryError;

/// Durable set of alert subscribers.
///
/// Owned by the process and injected wherever membership is read or
/// changed. The dispatcher never writes here itself; callers prune
/// subscribers it reports as permanently unreachable.
pub trait SubscriberRegistry: Send + Sync {
    /// Add a subscriber. Returns `true` if it was not already present.
    fn add(&self, id: SubscriberId) -> Result<bool, RegistryError>;

    /// Remove a subscriber. Returns `true` if it was present.
    fn remove(&self, id: SubscriberId) -> Result<bool, RegistryError>;

    /// Snapshot of all current subscribers.
    fn all(&self) -> Vec<SubscriberId>;

    fn len(&self) -> usize {
        self.all().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
