//! Polling cadence configuration.

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Sleep between price cycles in milliseconds.
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    /// Minimum gap between open interest fetches per symbol.
    #[serde(default = "default_oi_poll_interval_secs")]
    pub oi_poll_interval_secs: u64,
    /// Minimum gap between funding fetches per symbol.
    #[serde(default = "default_funding_poll_interval_secs")]
    pub funding_poll_interval_secs: u64,
    /// Interval of the summary log line.
    #[serde(default = "default_summary_interval_secs")]
    pub summary_interval_secs: u64,
}

const fn default_check_interval_ms() -> u64 {
    500
}

const fn default_oi_poll_interval_secs() -> u64 {
    10
}

const fn default_funding_poll_interval_secs() -> u64 {
    60
}

const fn default_summary_interval_secs() -> u64 {
    30
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: default_check_interval_ms(),
            oi_poll_interval_secs: default_oi_poll_interval_secs(),
            funding_poll_interval_secs: default_funding_poll_interval_secs(),
            summary_interval_secs: default_summary_interval_secs(),
        }
    }
}

impl PollingConfig {
    #[must_use]
    pub const fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    #[must_use]
    pub const fn oi_poll_interval(&self) -> Duration {
        Duration::from_secs(self.oi_poll_interval_secs)
    }

    #[must_use]
    pub const fn funding_poll_interval(&self) -> Duration {
        Duration::from_secs(self.funding_poll_interval_secs)
    }

    #[must_use]
    pub const fn summary_interval(&self) -> Duration {
        Duration::from_secs(self.summary_interval_secs)
    }
}
