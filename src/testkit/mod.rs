//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`clock`]: `ManualClock`, a settable [`Clock`](crate::port::outbound::clock::Clock).
//! - [`source`]: `ScriptedSource`, a [`MetricSource`](crate::port::outbound::source::MetricSource)
//!   fed from pre-loaded responses.
//! - [`sink`]: `RecordingSink`, a [`NotificationSink`](crate::port::outbound::notifier::NotificationSink)
//!   with per-subscriber failures and delays.
//! - [`registry`]: `MemoryRegistry`, an in-memory subscriber set.

pub mod clock;
pub mod registry;
pub mod sink;
pub mod source;
