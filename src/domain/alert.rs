//! Alert conditions produced by change detection.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::state::SymbolState;

/// A threshold crossing detected for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertCondition {
    /// Single-cycle price move against the immediately previous price.
    InstantPrice { symbol: String, change_pct: f64 },
    /// Sum of per-cycle moves within the accumulation window.
    AccumulatedPrice { symbol: String, change_pct: f64 },
    /// Open interest grew by at least the configured threshold.
    OpenInterestGrowth {
        symbol: String,
        growth_pct: f64,
        current: f64,
    },
}

impl AlertCondition {
    #[must_use]
    pub fn symbol(&self) -> &str {
        match self {
            Self::InstantPrice { symbol, .. }
            | Self::AccumulatedPrice { symbol, .. }
            | Self::OpenInterestGrowth { symbol, .. } => symbol,
        }
    }

    #[must_use]
    pub fn kind(&self) -> AlertKind {
        match self {
            Self::InstantPrice { .. } => AlertKind::InstantPrice,
            Self::AccumulatedPrice { .. } => AlertKind::AccumulatedPrice,
            Self::OpenInterestGrowth { .. } => AlertKind::OpenInterestGrowth,
        }
    }

    /// Signed percentage carried by the alert.
    #[must_use]
    pub fn change_pct(&self) -> f64 {
        match self {
            Self::InstantPrice { change_pct, .. } | Self::AccumulatedPrice { change_pct, .. } => {
                *change_pct
            }
            Self::OpenInterestGrowth { growth_pct, .. } => *growth_pct,
        }
    }
}

/// Alert class, used for labelling and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    InstantPrice,
    AccumulatedPrice,
    OpenInterestGrowth,
}

impl AlertKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InstantPrice => "Instant price move",
            Self::AccumulatedPrice => "Accumulated price move",
            Self::OpenInterestGrowth => "Open interest growth",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InstantPrice => "instant_price",
            Self::AccumulatedPrice => "accumulated_price",
            Self::OpenInterestGrowth => "oi_growth",
        })
    }
}

/// How quickly a move developed, relative to the accumulation window start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Fast,
    Normal,
    Slow,
}

impl Speed {
    const FAST_BELOW: Duration = Duration::from_secs(20);
    const NORMAL_BELOW: Duration = Duration::from_secs(60);

    #[must_use]
    pub fn from_elapsed(elapsed: Duration) -> Self {
        if elapsed < Self::FAST_BELOW {
            Self::Fast
        } else if elapsed < Self::NORMAL_BELOW {
            Self::Normal
        } else {
            Self::Slow
        }
    }
}

/// Context attached to an alert for rendering.
///
/// Captured at detection time, before any window reset, so the elapsed time
/// reflects how long the move took.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertContext {
    pub window_elapsed: Duration,
    pub open_interest: Option<f64>,
    pub funding_rate_pct: Option<f64>,
}

impl AlertContext {
    #[must_use]
    pub fn from_state(state: &SymbolState, now: DateTime<Utc>) -> Self {
        Self {
            window_elapsed: state.window_elapsed(now),
            open_interest: state.last_open_interest,
            funding_rate_pct: state.last_funding_rate,
        }
    }

    #[must_use]
    pub fn speed(&self) -> Speed {
        Speed::from_elapsed(self.window_elapsed)
    }
}

/// A detected condition together with its rendering context.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub condition: AlertCondition,
    pub context: AlertContext,
}

impl Alert {
    #[must_use]
    pub fn new(condition: AlertCondition, context: AlertContext) -> Self {
        Self { condition, context }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_boundaries() {
        assert_eq!(Speed::from_elapsed(Duration::from_secs(0)), Speed::Fast);
        assert_eq!(Speed::from_elapsed(Duration::from_millis(19_999)), Speed::Fast);
        assert_eq!(Speed::from_elapsed(Duration::from_secs(20)), Speed::Normal);
        assert_eq!(Speed::from_elapsed(Duration::from_secs(59)), Speed::Normal);
        assert_eq!(Speed::from_elapsed(Duration::from_secs(60)), Speed::Slow);
    }

    #[test]
    fn condition_accessors() {
        let oi = AlertCondition::OpenInterestGrowth {
            symbol: "ETHUSDT".into(),
            growth_pct: 6.0,
            current: 1_060_000.0,
        };
        assert_eq!(oi.symbol(), "ETHUSDT");
        assert_eq!(oi.kind(), AlertKind::OpenInterestGrowth);
        assert_eq!(oi.change_pct(), 6.0);
        assert_eq!(oi.kind().to_string(), "oi_growth");
    }
}
