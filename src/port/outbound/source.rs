//! Market-data source port.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::metric::{FundingReading, OpenInterestReading};
use crate::error::SourceError;

/// Fetches futures metrics from an exchange.
///
/// Implementations return a best-effort universe: malformed individual
/// readings are dropped rather than failing the whole call. Each request
/// must carry its own timeout; a timeout surfaces as
/// [`SourceError::Unavailable`].
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Current price for every tracked symbol, in one batched request.
    async fn fetch_all_prices(&self) -> Result<HashMap<String, f64>, SourceError>;

    /// Current open interest for one symbol.
    async fn fetch_open_interest(&self, symbol: &str) -> Result<OpenInterestReading, SourceError>;

    /// Current funding rate for one symbol.
    async fn fetch_funding_rate(&self, symbol: &str) -> Result<FundingReading, SourceError>;
}
