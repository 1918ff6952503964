//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use teloxide::Bot;
use tracing::info;

use crate::adapter::outbound::binance::client::BinanceFuturesClient;
use crate::adapter::outbound::store::file::FileSubscriberRegistry;
use crate::adapter::outbound::telegram::sink::TelegramSink;
use crate::application::detector::engine::ChangeDetector;
use crate::application::dispatch::{AlertDelivery, BroadcastDispatcher};
use crate::application::poller::Poller;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::clock::Clock;
use crate::port::outbound::registry::SubscriberRegistry;
use crate::port::outbound::source::MetricSource;

/// Open the subscriber file named in the configuration.
///
/// # Errors
///
/// Fails if the file cannot be read, created or parsed.
#[allow(clippy::result_large_err)]
pub(crate) fn open_registry(config: &Config) -> Result<Arc<dyn SubscriberRegistry>> {
    let registry = FileSubscriberRegistry::open(&config.subscribers_file)?;
    Ok(Arc::new(registry))
}

/// Telegram bot when enabled and a token is present.
///
/// # Errors
///
/// Fails if Telegram is enabled without `TELEGRAM_BOT_TOKEN`.
#[allow(clippy::result_large_err)]
pub(crate) fn build_bot(config: &Config) -> Result<Option<Bot>> {
    Ok(config.telegram_token()?.map(Bot::new))
}

pub(crate) fn build_source(config: &Config) -> Arc<dyn MetricSource> {
    info!(base_url = %config.source.base_url, "Binance futures source configured");
    Arc::new(BinanceFuturesClient::from_config(&config.source))
}

/// Broadcast through Telegram when a bot is available, otherwise log alerts.
pub(crate) fn build_delivery(config: &Config, bot: Option<&Bot>) -> AlertDelivery {
    match bot {
        Some(bot) => {
            info!("Telegram delivery enabled");
            let sink = Arc::new(TelegramSink::new(bot.clone()));
            AlertDelivery::Broadcast(BroadcastDispatcher::new(
                sink,
                config.telegram.dispatch_config(),
            ))
        }
        None => {
            info!("Telegram disabled, alerts are logged only");
            AlertDelivery::LogOnly
        }
    }
}

pub(crate) fn build_poller(
    config: &Config,
    source: Arc<dyn MetricSource>,
    delivery: AlertDelivery,
    registry: Arc<dyn SubscriberRegistry>,
    clock: Arc<dyn Clock>,
) -> Poller {
    Poller::new(
        source,
        ChangeDetector::new(config.detector_config()),
        delivery,
        registry,
        clock,
        config.poller_config(),
    )
}
