//! Infrastructure configuration modules.

pub mod alerts;
pub mod logging;
pub mod polling;
pub mod settings;
pub mod telegram;
