//! Binance futures source configuration.

use serde::Deserialize;

/// Connection and universe settings for the Binance futures source.
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceConfig {
    /// REST base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Only symbols ending with this quote asset are tracked.
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,
    /// Symbols starting with this prefix are not tradable and are skipped.
    #[serde(default = "default_excluded_prefix")]
    pub excluded_prefix: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Upper bound on concurrent per-symbol requests.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

fn default_base_url() -> String {
    "https://fapi.binance.com".into()
}

fn default_quote_asset() -> String {
    "USDT".into()
}

fn default_excluded_prefix() -> String {
    "USDT_".into()
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

const fn default_max_concurrent_requests() -> usize {
    8
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            quote_asset: default_quote_asset(),
            excluded_prefix: default_excluded_prefix(),
            request_timeout_ms: default_request_timeout_ms(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}
