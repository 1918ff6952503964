//! Tickwatch - futures market move alerts.
//!
//! Polls Binance USDT-M futures for price, open interest and funding, detects
//! significant moves and broadcasts alerts to Telegram subscribers.
//!
//! # Architecture
//!
//! Hexagonal layout:
//!
//! - **`domain`** - Pure types: snapshots, per-symbol state, alert conditions
//! - **`port`** - Traits for the market-data source, subscriber registry,
//!   notification sink and clock
//! - **`application`** - Change detection, broadcast dispatch and the
//!   polling loop
//! - **`adapter`** - Binance REST client, Telegram sink and command listener,
//!   JSON-file subscriber registry
//! - **`infrastructure`** - Configuration, logging and runtime wiring
//!
//! # Detection rules
//!
//! - **Instant**: a single tick moves at least `instant_threshold_pct`
//! - **Accumulated**: ticks above the noise floor sum to at least
//!   `accumulated_threshold_pct` within the window
//! - **Open interest**: growth between readings of at least
//!   `oi_growth_threshold_pct`, subject to a per-symbol cooldown
//!
//! # Example
//!
//! ```no_run
//! use tickwatch::infrastructure::config::settings::Config;
//!
//! let config = Config::load("config.toml").unwrap();
//! config.init_logging();
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
