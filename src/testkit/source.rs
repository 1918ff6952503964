//! Scripted market-data source.
//!
//! Each call pops the next scripted response. When a price script runs out
//! the source answers with an empty universe; when a per-symbol script runs
//! out it answers `Unavailable`.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::domain::metric::{FundingReading, OpenInterestReading};
use crate::error::SourceError;
use crate::port::outbound::source::MetricSource;

type PriceResult = Result<HashMap<String, f64>, SourceError>;

#[derive(Debug, Default)]
pub struct ScriptedSource {
    prices: Mutex<VecDeque<PriceResult>>,
    open_interest: Mutex<HashMap<String, VecDeque<Result<f64, SourceError>>>>,
    funding: Mutex<HashMap<String, VecDeque<Result<f64, SourceError>>>>,
    price_calls: Mutex<Vec<Instant>>,
    oi_calls: AtomicU32,
    funding_calls: AtomicU32,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful price response.
    pub fn push_prices(&self, prices: &[(&str, f64)]) -> &Self {
        let map = prices
            .iter()
            .map(|(symbol, price)| ((*symbol).to_string(), *price))
            .collect();
        self.prices.lock().push_back(Ok(map));
        self
    }

    /// Queue a failed price response.
    pub fn push_price_error(&self, error: SourceError) -> &Self {
        self.prices.lock().push_back(Err(error));
        self
    }

    pub fn push_open_interest(&self, symbol: &str, result: Result<f64, SourceError>) -> &Self {
        self.open_interest
            .lock()
            .entry(symbol.to_string())
            .or_default()
            .push_back(result);
        self
    }

    pub fn push_funding(&self, symbol: &str, result: Result<f64, SourceError>) -> &Self {
        self.funding
            .lock()
            .entry(symbol.to_string())
            .or_default()
            .push_back(result);
        self
    }

    /// Tokio instants at which `fetch_all_prices` was called.
    pub fn price_calls(&self) -> Vec<Instant> {
        self.price_calls.lock().clone()
    }

    pub fn oi_calls(&self) -> u32 {
        self.oi_calls.load(Ordering::SeqCst)
    }

    pub fn funding_calls(&self) -> u32 {
        self.funding_calls.load(Ordering::SeqCst)
    }
}

fn pop_symbol(
    scripts: &Mutex<HashMap<String, VecDeque<Result<f64, SourceError>>>>,
    symbol: &str,
) -> Result<f64, SourceError> {
    scripts
        .lock()
        .get_mut(symbol)
        .and_then(VecDeque::pop_front)
        .unwrap_or_else(|| Err(SourceError::Unavailable(format!("no script for {symbol}"))))
}

#[async_trait]
impl MetricSource for ScriptedSource {
    async fn fetch_all_prices(&self) -> Result<HashMap<String, f64>, SourceError> {
        self.price_calls.lock().push(Instant::now());
        self.prices
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(HashMap::new()))
    }

    async fn fetch_open_interest(&self, symbol: &str) -> Result<OpenInterestReading, SourceError> {
        self.oi_calls.fetch_add(1, Ordering::SeqCst);
        let value = pop_symbol(&self.open_interest, symbol)?;
        Ok(OpenInterestReading::new(symbol, value, Utc::now()))
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> Result<FundingReading, SourceError> {
        self.funding_calls.fetch_add(1, Ordering::SeqCst);
        let rate = pop_symbol(&self.funding, symbol)?;
        Ok(FundingReading::new(symbol, rate, Utc::now()))
    }
}
