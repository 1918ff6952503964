//! Change detection thresholds and timings.

use std::time::Duration;

/// Thresholds and timings for change detection.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Single-cycle move that fires an instant alert, in percent.
    pub instant_threshold_pct: f64,
    /// Windowed running sum that fires an accumulated alert, in percent.
    pub accumulated_threshold_pct: f64,
    /// Per-cycle moves smaller than this are not accumulated.
    pub noise_floor_pct: f64,
    pub window: Duration,
    /// Open interest growth that fires an alert, in percent.
    pub oi_growth_threshold_pct: f64,
    pub oi_cooldown: Duration,
    pub oi_poll_interval: Duration,
    pub funding_poll_interval: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            instant_threshold_pct: 3.0,
            accumulated_threshold_pct: 10.0,
            noise_floor_pct: 0.01,
            window: Duration::from_secs(15 * 60),
            oi_growth_threshold_pct: 5.0,
            oi_cooldown: Duration::from_secs(300),
            oi_poll_interval: Duration::from_secs(10),
            funding_poll_interval: Duration::from_secs(60),
        }
    }
}
