//! Application orchestration.
//!
//! Runtime wiring and lifecycle management: the polling loop starts once,
//! either immediately or when the first subscriber registers.

pub mod lifecycle;
pub mod runtime;
