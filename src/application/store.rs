//! Concurrent per-symbol state store.
//!
//! Each symbol's [`SymbolState`] is guarded by its own shard lock, so
//! evaluations for different symbols never block each other and two
//! evaluations of the same symbol never interleave.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::state::SymbolState;

#[derive(Debug, Default)]
pub struct SymbolStateStore {
    states: DashMap<String, SymbolState>,
}

impl SymbolStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to `symbol`'s state, creating a fresh
    /// state (window opening at `now`) on first sight.
    pub fn with_state<R>(
        &self,
        symbol: &str,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut SymbolState) -> R,
    ) -> R {
        let mut entry = self
            .states
            .entry(symbol.to_string())
            .or_insert_with(|| SymbolState::new(now));
        f(entry.value_mut())
    }

    /// Run `f` against an existing state only. Returns `None` for unknown symbols.
    pub fn update_existing<R>(
        &self,
        symbol: &str,
        f: impl FnOnce(&mut SymbolState) -> R,
    ) -> Option<R> {
        self.states.get_mut(symbol).map(|mut entry| f(entry.value_mut()))
    }

    /// Copy of a symbol's current state.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<SymbolState> {
        self.states.get(symbol).map(|entry| entry.value().clone())
    }

    /// Number of tracked symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn with_state_creates_on_first_access() {
        let store = SymbolStateStore::new();
        assert!(store.is_empty());

        store.with_state("BTCUSDT", t(5), |state| state.last_price = Some(1.0));

        let state = store.get("BTCUSDT").unwrap();
        assert_eq!(state.last_price, Some(1.0));
        assert_eq!(state.window_start, t(5));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn with_state_reuses_existing_entry() {
        let store = SymbolStateStore::new();
        store.with_state("ETHUSDT", t(0), |state| state.last_price = Some(2.0));

        let seen = store.with_state("ETHUSDT", t(100), |state| {
            (state.last_price, state.window_start)
        });

        assert_eq!(seen, (Some(2.0), t(0)));
    }

    #[test]
    fn update_existing_skips_unknown_symbols() {
        let store = SymbolStateStore::new();
        assert!(store.update_existing("XRPUSDT", |_| ()).is_none());
        assert!(store.is_empty());
    }
}
