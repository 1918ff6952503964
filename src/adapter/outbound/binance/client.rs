//! Binance USDT-M futures REST client.
//!
//! Read-only, unauthenticated. Three endpoints are used:
//! - `GET /fapi/v1/ticker/24hr` for the full price universe
//! - `GET /fapi/v1/openInterest` per symbol
//! - `GET /fapi/v1/premiumIndex` per symbol, for the last funding rate

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header::RETRY_AFTER, Client as HttpClient, Response, StatusCode};
use tracing::{debug, warn};

use super::dto::{
    filter_prices, millis_to_utc, parse_number, OpenInterestResponse, PremiumIndexResponse,
    TickerEntry,
};
use super::settings::BinanceConfig;
use crate::domain::metric::{FundingReading, OpenInterestReading};
use crate::error::SourceError;
use crate::port::outbound::source::MetricSource;

/// Pause applied when a rate-limit response carries no usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

const TICKER_PATH: &str = "/fapi/v1/ticker/24hr";
const OPEN_INTEREST_PATH: &str = "/fapi/v1/openInterest";
const PREMIUM_INDEX_PATH: &str = "/fapi/v1/premiumIndex";

/// HTTP client for the Binance futures market-data endpoints.
pub struct BinanceFuturesClient {
    http: HttpClient,
    timeout: Duration,
    base_url: String,
    quote_asset: String,
    excluded_prefix: String,
}

impl BinanceFuturesClient {
    #[must_use]
    pub fn from_config(config: &BinanceConfig) -> Self {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            timeout,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            quote_asset: config.quote_asset.clone(),
            excluded_prefix: config.excluded_prefix.clone(),
        }
    }

    async fn get<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, SourceError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await?;
        let response = check_status(response)?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SourceError::InvalidResponse(e.to_string()))
    }
}

/// Map rate-limit and error statuses onto [`SourceError`].
fn check_status(response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if is_rate_limit(status) {
        let retry_after = retry_after_from_header(
            response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok()),
        );
        warn!(
            status = status.as_u16(),
            retry_after_secs = retry_after.as_secs(),
            "Binance rate limit hit"
        );
        return Err(SourceError::RateLimited { retry_after });
    }
    response
        .error_for_status()
        .map_err(|err| SourceError::Unavailable(err.to_string()))
}

/// 429 is a rate limit; 418 is Binance's IP ban after ignoring 429s.
fn is_rate_limit(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT
}

/// Parse `Retry-After` as whole seconds, defaulting to [`DEFAULT_RETRY_AFTER`].
#[must_use]
pub fn retry_after_from_header(value: Option<&str>) -> Duration {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map_or(DEFAULT_RETRY_AFTER, Duration::from_secs)
}

#[async_trait]
impl MetricSource for BinanceFuturesClient {
    async fn fetch_all_prices(&self) -> Result<HashMap<String, f64>, SourceError> {
        let tickers: Vec<TickerEntry> = self.get(TICKER_PATH, &[]).await?;
        let total = tickers.len();
        let prices = filter_prices(tickers, &self.quote_asset, &self.excluded_prefix);
        debug!(total, tracked = prices.len(), "Fetched tickers");
        Ok(prices)
    }

    async fn fetch_open_interest(&self, symbol: &str) -> Result<OpenInterestReading, SourceError> {
        let resp: OpenInterestResponse = self
            .get(OPEN_INTEREST_PATH, &[("symbol", symbol)])
            .await?;
        let value = parse_number(&resp.open_interest).ok_or_else(|| {
            SourceError::InvalidResponse(format!("bad openInterest for {}", resp.symbol))
        })?;
        Ok(OpenInterestReading::new(
            resp.symbol,
            value,
            millis_to_utc(resp.time, Utc::now()),
        ))
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> Result<FundingReading, SourceError> {
        let resp: PremiumIndexResponse = self
            .get(PREMIUM_INDEX_PATH, &[("symbol", symbol)])
            .await?;
        let rate = parse_number(&resp.last_funding_rate).ok_or_else(|| {
            SourceError::InvalidResponse(format!("bad lastFundingRate for {}", resp.symbol))
        })?;
        Ok(FundingReading::new(
            resp.symbol,
            rate * 100.0,
            millis_to_utc(resp.time, Utc::now()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_parses_seconds() {
        assert_eq!(retry_after_from_header(Some("30")), Duration::from_secs(30));
        assert_eq!(retry_after_from_header(Some(" 5 ")), Duration::from_secs(5));
    }

    #[test]
    fn retry_after_defaults_when_missing_or_invalid() {
        assert_eq!(retry_after_from_header(None), DEFAULT_RETRY_AFTER);
        assert_eq!(retry_after_from_header(Some("soon")), DEFAULT_RETRY_AFTER);
        assert_eq!(retry_after_from_header(Some("0")), DEFAULT_RETRY_AFTER);
    }

    #[test]
    fn rate_limit_statuses() {
        assert!(is_rate_limit(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_rate_limit(StatusCode::IM_A_TEAPOT));
        assert!(!is_rate_limit(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_rate_limit(StatusCode::OK));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = BinanceConfig {
            base_url: "https://example.test/".into(),
            ..BinanceConfig::default()
        };
        let client = BinanceFuturesClient::from_config(&config);
        assert_eq!(client.base_url, "https://example.test");
    }

    #[tokio::test]
    async fn unresponsive_server_times_out_as_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = BinanceConfig {
            base_url: format!("http://{addr}"),
            request_timeout_ms: 100,
            ..BinanceConfig::default()
        };
        let client = BinanceFuturesClient::from_config(&config);

        let started = std::time::Instant::now();
        let err = client.fetch_open_interest("BTCUSDT").await.unwrap_err();

        assert!(matches!(err, SourceError::Unavailable(_)), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }
}
