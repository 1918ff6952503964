//! Top-level [`Config`]: the TOML sections for source, alerts, polling,
//! Telegram and logging, plus the subscriber file path.
//!
//! The Telegram bot token is never read from the file, only from the
//! `TELEGRAM_BOT_TOKEN` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use tickwatch::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::alerts::AlertsConfig;
use super::logging::LoggingConfig;
use super::polling::PollingConfig;
use super::telegram::TelegramAppConfig;
use crate::adapter::outbound::binance::settings::BinanceConfig;
use crate::application::detector::config::DetectorConfig;
use crate::application::poller::PollerConfig;
use crate::error::{ConfigError, Result};

/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Market-data source settings.
    #[serde(default)]
    pub source: BinanceConfig,

    /// Thresholds, window and cooldown.
    #[serde(default)]
    pub alerts: AlertsConfig,

    /// Loop and per-symbol fetch cadences.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Telegram delivery settings.
    #[serde(default)]
    pub telegram: TelegramAppConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Path of the subscriber registry file.
    #[serde(default = "default_subscribers_file")]
    pub subscribers_file: PathBuf,

    /// Bot token, populated from the environment.
    #[serde(skip)]
    pub telegram_token: Option<String>,
}

fn default_subscribers_file() -> PathBuf {
    PathBuf::from("subscribers.json")
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        config.telegram_token = std::env::var(TELEGRAM_TOKEN_ENV)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.source.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "base_url" }.into());
        }
        url::Url::parse(&self.source.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "base_url",
            reason: e.to_string(),
        })?;
        if self.source.quote_asset.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "quote_asset",
            }
            .into());
        }
        if self.source.request_timeout_ms == 0 {
            return Err(positive("request_timeout_ms"));
        }
        if self.source.max_concurrent_requests == 0 {
            return Err(positive("max_concurrent_requests"));
        }

        let alerts = &self.alerts;
        for (field, value) in [
            ("instant_threshold_pct", alerts.instant_threshold_pct),
            ("accumulated_threshold_pct", alerts.accumulated_threshold_pct),
            ("oi_growth_threshold_pct", alerts.oi_growth_threshold_pct),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(positive(field));
            }
        }
        if !(alerts.noise_floor_pct.is_finite() && alerts.noise_floor_pct >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "noise_floor_pct",
                reason: "must be 0 or greater".to_string(),
            }
            .into());
        }
        if alerts.noise_floor_pct >= alerts.accumulated_threshold_pct {
            return Err(ConfigError::InvalidValue {
                field: "noise_floor_pct",
                reason: "must be below accumulated_threshold_pct".to_string(),
            }
            .into());
        }
        if alerts.window_secs == 0 {
            return Err(positive("window_secs"));
        }

        let polling = &self.polling;
        for (field, value) in [
            ("check_interval_ms", polling.check_interval_ms),
            ("oi_poll_interval_secs", polling.oi_poll_interval_secs),
            ("funding_poll_interval_secs", polling.funding_poll_interval_secs),
            ("summary_interval_secs", polling.summary_interval_secs),
        ] {
            if value == 0 {
                return Err(positive(field));
            }
        }

        if self.telegram.send_timeout_ms == 0 {
            return Err(positive("send_timeout_ms"));
        }
        if self.telegram.max_concurrent_sends == 0 {
            return Err(positive("max_concurrent_sends"));
        }

        if self.subscribers_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "subscribers_file",
            }
            .into());
        }

        Ok(())
    }

    /// Bot token when Telegram is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if Telegram is enabled and the
    /// token is not set.
    #[allow(clippy::result_large_err)]
    pub fn telegram_token(&self) -> Result<Option<&str>> {
        if !self.telegram.enabled {
            return Ok(None);
        }
        self.telegram_token
            .as_deref()
            .map(Some)
            .ok_or_else(|| {
                ConfigError::MissingField {
                    field: TELEGRAM_TOKEN_ENV,
                }
                .into()
            })
    }

    #[must_use]
    pub fn detector_config(&self) -> DetectorConfig {
        self.alerts.detector_config(
            self.polling.oi_poll_interval(),
            self.polling.funding_poll_interval(),
        )
    }

    #[must_use]
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            check_interval: self.polling.check_interval(),
            summary_interval: self.polling.summary_interval(),
            max_concurrent_requests: self.source.max_concurrent_requests,
        }
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn positive(field: &'static str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: "must be greater than 0".to_string(),
    }
    .into()
}
