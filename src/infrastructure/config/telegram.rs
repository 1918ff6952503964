//! Telegram delivery configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::dispatch::DispatchConfig;

const fn default_true() -> bool {
    true
}

/// Telegram delivery configuration.
///
/// The bot token is never read from the file; see
/// [`Config::telegram_token`](super::settings::Config::telegram_token).
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramAppConfig {
    /// Deliver alerts and listen for commands via Telegram. When false,
    /// alerts are only logged.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Per-message send timeout in milliseconds.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
    /// Upper bound on concurrent sends during a broadcast.
    #[serde(default = "default_max_concurrent_sends")]
    pub max_concurrent_sends: usize,
}

const fn default_send_timeout_ms() -> u64 {
    10_000
}

const fn default_max_concurrent_sends() -> usize {
    16
}

impl Default for TelegramAppConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            send_timeout_ms: default_send_timeout_ms(),
            max_concurrent_sends: default_max_concurrent_sends(),
        }
    }
}

impl TelegramAppConfig {
    #[must_use]
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            send_timeout: Duration::from_millis(self.send_timeout_ms),
            max_concurrent_sends: self.max_concurrent_sends,
        }
    }
}
