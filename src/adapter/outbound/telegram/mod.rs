//! Telegram delivery and subscription commands.
//!
//! - [`sink`] - [`TelegramSink`](sink::TelegramSink), the alert delivery sink
//! - [`command`] - `/start`, `/stop`, `/help` parsing and handling
//! - [`listener`] - Long-polling command listener built on `teloxide::repl`

pub mod command;
pub mod listener;
pub mod sink;
