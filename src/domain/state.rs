//! Per-symbol tracking state.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Mutable tracking record for one symbol.
///
/// Values that have never been observed are `None`, so "no baseline yet" is
/// distinguishable from a real zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolState {
    /// Price seen on the previous cycle.
    pub last_price: Option<f64>,
    /// Running sum of per-cycle percent deltas since `window_start`.
    pub accumulated_change_pct: f64,
    pub window_start: DateTime<Utc>,
    pub last_open_interest: Option<f64>,
    pub last_oi_fetch: Option<DateTime<Utc>>,
    pub last_funding_rate: Option<f64>,
    pub last_funding_fetch: Option<DateTime<Utc>>,
    /// Cooldown gate for open interest alerts.
    pub last_oi_alert: Option<DateTime<Utc>>,
}

impl SymbolState {
    /// Fresh state with an accumulation window opening at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_price: None,
            accumulated_change_pct: 0.0,
            window_start: now,
            last_open_interest: None,
            last_oi_fetch: None,
            last_funding_rate: None,
            last_funding_fetch: None,
            last_oi_alert: None,
        }
    }

    /// Time since the accumulation window opened.
    #[must_use]
    pub fn window_elapsed(&self, now: DateTime<Utc>) -> Duration {
        elapsed_between(self.window_start, now)
    }

    /// Zero the accumulator and open a new window at `now`.
    pub fn reset_window(&mut self, now: DateTime<Utc>) {
        self.accumulated_change_pct = 0.0;
        self.window_start = now;
    }

    /// True when open interest has never been fetched or `interval` has passed.
    #[must_use]
    pub fn open_interest_due(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        is_due(self.last_oi_fetch, now, interval)
    }

    /// True when funding has never been fetched or `interval` has passed.
    #[must_use]
    pub fn funding_due(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        is_due(self.last_funding_fetch, now, interval)
    }
}

/// Non-negative elapsed time; a clock that went backwards yields zero.
#[must_use]
pub fn elapsed_between(since: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - since).to_std().unwrap_or(Duration::ZERO)
}

fn is_due(last: Option<DateTime<Utc>>, now: DateTime<Utc>, interval: Duration) -> bool {
    last.map_or(true, |at| elapsed_between(at, now) >= interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn new_state_has_no_baseline() {
        let state = SymbolState::new(t(0));
        assert!(state.last_price.is_none());
        assert!(state.last_open_interest.is_none());
        assert!(state.last_funding_rate.is_none());
        assert_eq!(state.accumulated_change_pct, 0.0);
        assert_eq!(state.window_start, t(0));
    }

    #[test]
    fn cadence_due_when_never_fetched() {
        let state = SymbolState::new(t(0));
        assert!(state.open_interest_due(t(0), Duration::from_secs(10)));
        assert!(state.funding_due(t(0), Duration::from_secs(60)));
    }

    #[test]
    fn cadence_waits_for_interval() {
        let mut state = SymbolState::new(t(0));
        state.last_oi_fetch = Some(t(0));
        assert!(!state.open_interest_due(t(9), Duration::from_secs(10)));
        assert!(state.open_interest_due(t(10), Duration::from_secs(10)));
    }

    #[test]
    fn backwards_clock_counts_as_zero_elapsed() {
        let state = SymbolState::new(t(100));
        assert_eq!(state.window_elapsed(t(50)), Duration::ZERO);
    }
}
