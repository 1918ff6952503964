//! Alert threshold configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::detector::config::DetectorConfig;

/// Thresholds, window and cooldown for change detection.
///
/// Percentages are plain percent values: `3.0` means 3%.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertsConfig {
    /// Single-tick price move that fires an instant alert.
    #[serde(default = "default_instant_threshold_pct")]
    pub instant_threshold_pct: f64,
    /// Net move within the window that fires an accumulated alert.
    #[serde(default = "default_accumulated_threshold_pct")]
    pub accumulated_threshold_pct: f64,
    /// Open interest growth between readings that fires an OI alert.
    #[serde(default = "default_oi_growth_threshold_pct")]
    pub oi_growth_threshold_pct: f64,
    /// Ticks smaller than this are not accumulated.
    #[serde(default = "default_noise_floor_pct")]
    pub noise_floor_pct: f64,
    /// Accumulation window length.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Minimum gap between OI alerts for one symbol.
    #[serde(default = "default_oi_cooldown_secs")]
    pub oi_cooldown_secs: u64,
}

const fn default_instant_threshold_pct() -> f64 {
    3.0
}

const fn default_accumulated_threshold_pct() -> f64 {
    10.0
}

const fn default_oi_growth_threshold_pct() -> f64 {
    5.0
}

const fn default_noise_floor_pct() -> f64 {
    0.01
}

const fn default_window_secs() -> u64 {
    900
}

const fn default_oi_cooldown_secs() -> u64 {
    300
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            instant_threshold_pct: default_instant_threshold_pct(),
            accumulated_threshold_pct: default_accumulated_threshold_pct(),
            oi_growth_threshold_pct: default_oi_growth_threshold_pct(),
            noise_floor_pct: default_noise_floor_pct(),
            window_secs: default_window_secs(),
            oi_cooldown_secs: default_oi_cooldown_secs(),
        }
    }
}

impl AlertsConfig {
    /// Combine with the polling cadences into a detector configuration.
    #[must_use]
    pub fn detector_config(
        &self,
        oi_poll_interval: Duration,
        funding_poll_interval: Duration,
    ) -> DetectorConfig {
        DetectorConfig {
            instant_threshold_pct: self.instant_threshold_pct,
            accumulated_threshold_pct: self.accumulated_threshold_pct,
            noise_floor_pct: self.noise_floor_pct,
            window: Duration::from_secs(self.window_secs),
            oi_growth_threshold_pct: self.oi_growth_threshold_pct,
            oi_cooldown: Duration::from_secs(self.oi_cooldown_secs),
            oi_poll_interval,
            funding_poll_interval,
        }
    }
}
