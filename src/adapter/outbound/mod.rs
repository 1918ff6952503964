//! Outbound adapters (driven side).
//!
//! - [`binance`] - Binance USDT-M futures market data
//! - [`telegram`] - Alert delivery and subscription commands
//! - [`store`] - File-backed subscriber registry

pub mod binance;
pub mod store;
pub mod telegram;
