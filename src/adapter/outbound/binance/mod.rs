//! Binance USDT-M futures market data.
//!
//! Implements [`MetricSource`](crate::port::outbound::source::MetricSource)
//! over the public REST endpoints for tickers, open interest and funding.

pub mod client;
pub mod dto;
pub mod settings;
