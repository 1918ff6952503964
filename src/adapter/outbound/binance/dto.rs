//! Binance futures REST response types.
//!
//! Binance encodes numbers as JSON strings. Fields are kept as raw
//! [`serde_json::Value`] where a single malformed entry must not fail the
//! whole response.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// One entry from `GET /fapi/v1/ticker/24hr`.
#[derive(Debug, Deserialize)]
pub struct TickerEntry {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(rename = "lastPrice", default)]
    pub last_price: Option<serde_json::Value>,
}

/// `GET /fapi/v1/openInterest?symbol=...`
#[derive(Debug, Deserialize)]
pub struct OpenInterestResponse {
    pub symbol: String,
    #[serde(rename = "openInterest")]
    pub open_interest: serde_json::Value,
    #[serde(default)]
    pub time: Option<i64>,
}

/// `GET /fapi/v1/premiumIndex?symbol=...`
#[derive(Debug, Deserialize)]
pub struct PremiumIndexResponse {
    pub symbol: String,
    /// Funding rate as a fraction (0.0001 == 0.01%).
    #[serde(rename = "lastFundingRate")]
    pub last_funding_rate: serde_json::Value,
    #[serde(default)]
    pub time: Option<i64>,
}

/// Parse a Binance numeric field given as a string or a number.
#[must_use]
pub fn parse_number(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        serde_json::Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}

/// Millisecond epoch to UTC, falling back to `fallback` when absent or out of range.
#[must_use]
pub fn millis_to_utc(millis: Option<i64>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    millis
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .unwrap_or(fallback)
}

/// Reduce a ticker list to `symbol → price` for the tracked universe.
///
/// Keeps symbols ending with `quote_asset` and not starting with
/// `excluded_prefix`. Entries with a missing, unparseable or non-positive
/// price are dropped.
#[must_use]
pub fn filter_prices(
    tickers: Vec<TickerEntry>,
    quote_asset: &str,
    excluded_prefix: &str,
) -> HashMap<String, f64> {
    tickers
        .into_iter()
        .filter_map(|ticker| {
            let symbol = ticker.symbol?;
            if !symbol.ends_with(quote_asset)
                || (!excluded_prefix.is_empty() && symbol.starts_with(excluded_prefix))
            {
                return None;
            }
            let price = parse_number(ticker.last_price.as_ref()?)?;
            (price > 0.0).then_some((symbol, price))
        })
        .collect()
}
