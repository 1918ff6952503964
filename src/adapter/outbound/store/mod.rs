//! Subscriber persistence.

pub mod file;
