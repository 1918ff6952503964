//! Telegram alert delivery.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::{ApiError, RequestError};

use crate::domain::id::SubscriberId;
use crate::error::DeliveryError;
use crate::port::outbound::notifier::NotificationSink;

/// Sends alert text to a Telegram chat per subscriber.
///
/// Plain text only; alert bodies carry symbols with underscores that
/// Markdown would mangle.
#[derive(Clone)]
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn send(&self, subscriber: SubscriberId, text: &str) -> Result<(), DeliveryError> {
        self.bot
            .send_message(ChatId(subscriber.get()), text)
            .await
            .map(|_| ())
            .map_err(|e| classify_request_error(&e))
    }
}

/// Split Telegram failures into "drop this subscriber" and "try next time".
#[must_use]
pub fn classify_request_error(err: &RequestError) -> DeliveryError {
    match err {
        RequestError::Api(
            ApiError::BotBlocked
            | ApiError::ChatNotFound
            | ApiError::UserDeactivated
            | ApiError::BotKicked
            | ApiError::BotKickedFromSupergroup,
        ) => DeliveryError::PermanentlyUnreachable(err.to_string()),
        _ => DeliveryError::Transient(err.to_string()),
    }
}
