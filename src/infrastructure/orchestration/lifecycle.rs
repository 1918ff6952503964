//! Polling loop start gate.

use tokio::sync::{watch, Notify};
use tracing::info;

use crate::port::outbound::registry::SubscriberRegistry;

/// Why the gate opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartGate {
    /// At least one subscriber exists; start polling.
    Open,
    /// Shutdown was requested first.
    Shutdown,
}

/// Wait until the registry has a subscriber or shutdown is requested.
///
/// `subscribed` is signalled by the command handler on every new
/// registration. The registry is re-checked after each signal, so a
/// subscriber that registers and leaves before the check does not open the
/// gate.
pub async fn wait_for_subscriber(
    registry: &dyn SubscriberRegistry,
    subscribed: &Notify,
    mut shutdown: watch::Receiver<bool>,
) -> StartGate {
    let mut logged = false;
    loop {
        if *shutdown.borrow() {
            return StartGate::Shutdown;
        }
        if !registry.is_empty() {
            return StartGate::Open;
        }
        if !logged {
            info!("No subscribers yet, waiting for the first registration");
            logged = true;
        }

        tokio::select! {
            () = subscribed.notified() => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return StartGate::Shutdown;
                }
            }
        }
    }
}
