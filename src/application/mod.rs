//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.
//!
//! - [`detector`] - Instant / accumulated price and open interest detection
//! - [`store`] - Concurrent per-symbol state
//! - [`format`] - Alert text rendering
//! - [`dispatch`] - Broadcast to subscribers with failure classification
//! - [`poller`] - The polling loop tying it all together

pub mod detector;
pub mod dispatch;
pub mod format;
pub mod poller;
pub mod store;
