//! Handler for the `run` command.

use std::future::Future;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use super::args::{Cli, RunArgs};
use crate::error::Result;
use crate::infrastructure::config::logging::LogFormat;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration::runtime::run_with_shutdown;

/// Execute the run command.
pub async fn execute(cli: &Cli, args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&cli.config)?;

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = LogFormat::Json;
    }
    if args.no_telegram {
        config.telegram.enabled = false;
    }

    config.init_logging();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "tickwatch starting"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(forward_shutdown(signal::ctrl_c(), shutdown_tx));

    run_with_shutdown(config, shutdown_rx).await?;

    info!("tickwatch stopped");
    Ok(())
}

/// Flip `shutdown` once `signal` fires.
///
/// If the signal handler cannot be installed the sender is held forever, so
/// the loop keeps running until the process is killed.
async fn forward_shutdown<F>(signal: F, shutdown: watch::Sender<bool>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("Shutdown signal received");
            let _ = shutdown.send(true);
        }
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn signal_flips_shutdown() {
        let (tx, mut rx) = watch::channel(false);

        forward_shutdown(async { Ok(()) }, tx).await;

        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_signal_keeps_running() {
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(forward_shutdown(
            async { Err(std::io::Error::other("no signal handler")) },
            tx,
        ));

        tokio::time::sleep(Duration::from_secs(3600)).await;

        assert!(!*rx.borrow());
        assert_eq!(rx.has_changed().ok(), Some(false));
        assert!(!handle.is_finished());
        handle.abort();
    }
}
