//! Runtime lifecycle.

use std::sync::Arc;

use tokio::sync::{watch, Notify};
use tracing::info;

use super::lifecycle::{wait_for_subscriber, StartGate};
use crate::adapter::outbound::telegram::command::SubscriptionControl;
use crate::adapter::outbound::telegram::listener::run_command_listener;
use crate::error::Result;
use crate::infrastructure::bootstrap::{
    build_bot, build_delivery, build_poller, build_source, open_registry,
};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::clock::SystemClock;

/// Wire components and run until `shutdown` flips to `true`.
///
/// With Telegram enabled the loop is held back until a subscriber exists,
/// then started exactly once; later registrations only add recipients.
/// With Telegram disabled the loop starts immediately and alerts are
/// only logged.
///
/// # Errors
///
/// Fails on a missing bot token or an unreadable subscriber file. Nothing
/// after startup is fatal.
pub async fn run_with_shutdown(config: Config, shutdown: watch::Receiver<bool>) -> Result<()> {
    let registry = open_registry(&config)?;
    let bot = build_bot(&config)?;
    let source = build_source(&config);
    let delivery = build_delivery(&config, bot.as_ref());
    let subscribed = Arc::new(Notify::new());

    let listener = bot.map(|bot| {
        let control = SubscriptionControl::new(
            Arc::clone(&registry),
            Arc::clone(&subscribed),
            config.alerts.instant_threshold_pct,
        );
        tokio::spawn(run_command_listener(bot, control))
    });

    let poller = build_poller(
        &config,
        source,
        delivery,
        Arc::clone(&registry),
        Arc::new(SystemClock),
    );

    let gate = if listener.is_some() {
        wait_for_subscriber(registry.as_ref(), &subscribed, shutdown.clone()).await
    } else {
        StartGate::Open
    };

    if gate == StartGate::Open {
        info!(subscribers = registry.len(), "Starting polling loop");
        poller.run(shutdown).await;
    }

    if let Some(handle) = listener {
        handle.abort();
    }
    Ok(())
}
