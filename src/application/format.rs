//! Alert message formatting.
//!
//! Output is plain text (no parse mode), one fact per line. Context lines
//! for open interest and funding appear only when the value is known.

use std::fmt::Write;
use std::time::Duration;

use crate::domain::alert::{AlertCondition, AlertContext, Speed};

/// Exchange tag rendered on the headline.
pub const EXCHANGE_TAG: &str = "Binance";

/// Render an alert into notification text.
#[must_use]
pub fn format_alert(condition: &AlertCondition, context: &AlertContext) -> String {
    let change = condition.change_pct();
    let emoji = if change >= 0.0 { "🟢" } else { "🔴" };

    let mut msg = format!(
        "{emoji} {} {change:+.2}% {EXCHANGE_TAG}\n\
        {}\n\
        {} {}",
        condition.symbol(),
        condition.kind().label(),
        speed_label(context.speed()),
        format_elapsed(context.window_elapsed),
    );

    if let Some(oi) = context.open_interest {
        let _ = write!(msg, "\nOI: {}", format_compact(oi));
    }
    if let Some(rate) = context.funding_rate_pct {
        let _ = write!(msg, "\nFunding: {rate:+.4}%");
    }

    msg
}

fn speed_label(speed: Speed) -> &'static str {
    match speed {
        Speed::Fast => "⚡ FAST",
        Speed::Normal => "🏃 NORMAL",
        Speed::Slow => "🐢 SLOW",
    }
}

/// `42s` under a minute, whole minutes after that. Both are truncated.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else {
        format!("{}min", secs / 60)
    }
}

/// Compact magnitude, e.g. `1.06M`.
#[must_use]
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{value:.2}")
    }
}
