//! Per-symbol change detection.
//!
//! - [`config`] - Thresholds, window, cooldown and cadences
//! - [`engine`] - [`ChangeDetector`](engine::ChangeDetector), the stateless evaluator

pub mod config;
pub mod engine;
