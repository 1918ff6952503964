//! Metric readings produced by the market-data source.

use chrono::{DateTime, Utc};

/// One price observation for a symbol, produced once per poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub symbol: String,
    /// Last traded price. Always positive; the source drops anything else.
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(symbol: impl Into<String>, price: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            timestamp,
        }
    }
}

/// Open interest for a symbol, fetched on a slower cadence than price.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenInterestReading {
    pub symbol: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl OpenInterestReading {
    pub fn new(symbol: impl Into<String>, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            value,
            timestamp,
        }
    }
}

/// Funding rate for a perpetual contract, in percent (0.01 means 0.01%).
#[derive(Debug, Clone, PartialEq)]
pub struct FundingReading {
    pub symbol: String,
    pub rate_percent: f64,
    pub as_of: DateTime<Utc>,
}

impl FundingReading {
    pub fn new(symbol: impl Into<String>, rate_percent: f64, as_of: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            rate_percent,
            as_of,
        }
    }
}
