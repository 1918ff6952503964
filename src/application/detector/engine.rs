//! Per-symbol change detection.
//!
//! Two independent lenses run over the price stream every cycle:
//!
//! - **instant**: the move since the immediately previous price
//! - **accumulated**: the running sum of per-cycle moves inside a window
//!
//! Open interest runs on its own cadence and alerts only on growth, gated
//! by a per-symbol cooldown. Funding is recorded for context and never
//! alerts by itself.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::config::DetectorConfig;
use crate::domain::alert::{Alert, AlertCondition, AlertContext};
use crate::domain::metric::{FundingReading, OpenInterestReading, Snapshot};
use crate::domain::state::{elapsed_between, SymbolState};

/// Float slack for threshold comparisons, in percentage points.
const THRESHOLD_TOLERANCE: f64 = 1e-9;

/// Stateless evaluator; all per-symbol memory lives in [`SymbolState`].
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    config: DetectorConfig,
}

impl ChangeDetector {
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Evaluate a price snapshot against the symbol's state.
    ///
    /// The comparison baseline always advances to `snapshot.price`, whichever
    /// alerts fire.
    pub fn evaluate(&self, snapshot: &Snapshot, state: &mut SymbolState) -> Vec<Alert> {
        let now = snapshot.timestamp;

        if state.window_elapsed(now) >= self.config.window {
            state.reset_window(now);
        }

        let Some(last_price) = state.last_price else {
            state.last_price = Some(snapshot.price);
            return Vec::new();
        };

        let mut alerts = Vec::new();
        let instant = percent_change(last_price, snapshot.price);

        if crosses(instant.abs(), self.config.instant_threshold_pct) {
            alerts.push(Alert::new(
                AlertCondition::InstantPrice {
                    symbol: snapshot.symbol.clone(),
                    change_pct: instant,
                },
                AlertContext::from_state(state, now),
            ));
        }

        if instant.abs() >= self.config.noise_floor_pct {
            state.accumulated_change_pct += instant;
            debug!(
                symbol = %snapshot.symbol,
                instant_pct = instant,
                accumulated_pct = state.accumulated_change_pct,
                "Price moved"
            );

            if crosses(
                state.accumulated_change_pct.abs(),
                self.config.accumulated_threshold_pct,
            ) {
                alerts.push(Alert::new(
                    AlertCondition::AccumulatedPrice {
                        symbol: snapshot.symbol.clone(),
                        change_pct: state.accumulated_change_pct,
                    },
                    AlertContext::from_state(state, now),
                ));
                state.reset_window(now);
            }
        }

        state.last_price = Some(snapshot.price);
        alerts
    }

    /// True when the symbol's open interest should be refreshed at `now`.
    #[must_use]
    pub fn open_interest_due(&self, state: &SymbolState, now: DateTime<Utc>) -> bool {
        state.open_interest_due(now, self.config.oi_poll_interval)
    }

    /// True when the symbol's funding rate should be refreshed at `now`.
    #[must_use]
    pub fn funding_due(&self, state: &SymbolState, now: DateTime<Utc>) -> bool {
        state.funding_due(now, self.config.funding_poll_interval)
    }

    /// Evaluate a fresh open interest reading observed at `now`.
    ///
    /// Alerts only on growth, and not within the cooldown of the previous
    /// open interest alert. The stored reading and fetch time are updated
    /// unconditionally.
    pub fn evaluate_oi(
        &self,
        reading: &OpenInterestReading,
        state: &mut SymbolState,
        now: DateTime<Utc>,
    ) -> Option<Alert> {
        let prior = state.last_open_interest.filter(|prior| *prior > 0.0);

        state.last_open_interest = Some(reading.value);
        state.last_oi_fetch = Some(now);

        let growth = percent_change(prior?, reading.value);
        if !crosses(growth, self.config.oi_growth_threshold_pct) {
            return None;
        }

        let cooled_down = state
            .last_oi_alert
            .map_or(true, |at| elapsed_between(at, now) > self.config.oi_cooldown);
        if !cooled_down {
            debug!(
                symbol = %reading.symbol,
                growth_pct = growth,
                "Open interest growth suppressed by cooldown"
            );
            return None;
        }

        state.last_oi_alert = Some(now);
        Some(Alert::new(
            AlertCondition::OpenInterestGrowth {
                symbol: reading.symbol.clone(),
                growth_pct: growth,
                current: reading.value,
            },
            AlertContext::from_state(state, now),
        ))
    }

    /// Record a funding reading for alert context.
    ///
    /// `now` is the local poll time that drives the funding cadence;
    /// `reading.as_of` is the exchange's own timestamp.
    pub fn record_funding(
        &self,
        reading: &FundingReading,
        state: &mut SymbolState,
        now: DateTime<Utc>,
    ) {
        state.last_funding_rate = Some(reading.rate_percent);
        state.last_funding_fetch = Some(now);
    }
}

/// Percent change from `from` to `to`.
///
/// Multiplies before dividing so round inputs (100 → 97) give exact results.
#[must_use]
pub fn percent_change(from: f64, to: f64) -> f64 {
    (to - from) * 100.0 / from
}

fn crosses(value: f64, threshold: f64) -> bool {
    value + THRESHOLD_TOLERANCE >= threshold
}
