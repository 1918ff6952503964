//! Command-line interface.

pub mod args;
pub mod check;
pub mod run;
