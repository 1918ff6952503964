//! Exchange-agnostic domain types.
//!
//! - [`id`] - Subscriber identifiers
//! - [`metric`] - Price, open-interest and funding readings
//! - [`state`] - Per-symbol tracking state
//! - [`alert`] - Alert conditions and their rendering context

pub mod alert;
pub mod id;
pub mod metric;
pub mod state;
