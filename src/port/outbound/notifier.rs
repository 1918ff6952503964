//! Notification sink port for alert delivery.

use async_trait::async_trait;

use crate::domain::id::SubscriberId;
use crate::error::DeliveryError;

/// Delivers rendered alert text to one subscriber.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - Failures must be classified: [`DeliveryError::PermanentlyUnreachable`]
///   when the recipient is gone for good, [`DeliveryError::Transient`]
///   otherwise
/// - The caller applies its own timeout; implementations need not
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, subscriber: SubscriberId, text: &str) -> Result<(), DeliveryError>;
}
