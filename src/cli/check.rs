//! Handler for the `check` command.

use std::path::Path;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Validate configuration file without starting the loop.
pub fn execute<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    println!("Checking configuration: {}", path.display());
    println!();

    let config = Config::load(path)?;

    println!("✓ Configuration file is valid");
    println!();
    println!("Summary:");
    println!("  Source: {}", config.source.base_url);
    println!(
        "  Universe: *{} (excluding {}*)",
        config.source.quote_asset, config.source.excluded_prefix
    );
    println!(
        "  Thresholds: instant {}%, accumulated {}% / {}s, OI {}%",
        config.alerts.instant_threshold_pct,
        config.alerts.accumulated_threshold_pct,
        config.alerts.window_secs,
        config.alerts.oi_growth_threshold_pct,
    );
    println!("  Subscribers file: {}", config.subscribers_file.display());
    println!();

    if config.telegram.enabled {
        if config.telegram_token.is_some() {
            println!("✓ Telegram configured and enabled");
        } else {
            println!("⚠ Telegram enabled but TELEGRAM_BOT_TOKEN is not set");
        }
    } else {
        println!("  Telegram: disabled (alerts are logged only)");
    }

    println!();
    println!("Configuration is ready to use.");
    Ok(())
}
