//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`orchestration`] - Runtime lifecycle

pub mod bootstrap;
pub mod config;
pub mod orchestration;
