//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies such as the
//! market-data exchange, subscriber storage, message delivery and time.

pub mod clock;
pub mod notifier;
pub mod registry;
pub mod source;
