//! Telegram command parsing and handling.

use std::sync::Arc;

use tokio::sync::Notify;
use tracing::{info, warn};

use crate::domain::id::SubscriberId;
use crate::port::outbound::registry::SubscriberRegistry;

/// Label of the reply-keyboard button that acts like `/start`.
pub const START_BUTTON: &str = "Start";

/// Supported bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Stop,
    Help,
}

/// Parse error for Telegram command messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    NotACommand,
    UnknownCommand(String),
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotACommand => write!(f, "message is not a command"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command `{cmd}`"),
        }
    }
}

impl std::error::Error for CommandParseError {}

/// Parse a Telegram message into a bot command.
///
/// Accepts `/cmd` and `/cmd@bot_name`, plus the bare `Start` button text.
pub fn parse_command(text: &str) -> Result<BotCommand, CommandParseError> {
    let text = text.trim();
    if text == START_BUTTON {
        return Ok(BotCommand::Start);
    }

    let Some(raw_command) = text.split_whitespace().next() else {
        return Err(CommandParseError::NotACommand);
    };
    if !raw_command.starts_with('/') {
        return Err(CommandParseError::NotACommand);
    }

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);

    match command {
        "/start" => Ok(BotCommand::Start),
        "/stop" => Ok(BotCommand::Stop),
        "/help" => Ok(BotCommand::Help),
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Bot commands for Telegram menu registration, as (command, description).
#[must_use]
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("start", "Subscribe to futures move alerts"),
        ("stop", "Unsubscribe"),
        ("help", "Show all commands"),
    ]
}

/// Registry access and lifecycle signal shared by the command handler.
#[derive(Clone)]
pub struct SubscriptionControl {
    registry: Arc<dyn SubscriberRegistry>,
    /// Fired whenever a new subscriber is added; the runtime waits on it
    /// before starting the polling loop.
    subscribed: Arc<Notify>,
    instant_threshold_pct: f64,
}

impl SubscriptionControl {
    #[must_use]
    pub fn new(
        registry: Arc<dyn SubscriberRegistry>,
        subscribed: Arc<Notify>,
        instant_threshold_pct: f64,
    ) -> Self {
        Self {
            registry,
            subscribed,
            instant_threshold_pct,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<dyn SubscriberRegistry> {
        &self.registry
    }
}

/// Apply a command for `chat` and return the reply text.
///
/// Registry write failures are logged and reported to the user; they do
/// not stop the listener.
pub fn handle_command(
    command: BotCommand,
    chat: SubscriberId,
    control: &SubscriptionControl,
) -> String {
    match command {
        BotCommand::Start => match control.registry.add(chat) {
            Ok(added) => {
                if added {
                    info!(subscriber = %chat, "Subscriber registered");
                    control.subscribed.notify_one();
                }
                welcome_text(control.instant_threshold_pct, added)
            }
            Err(e) => {
                warn!(subscriber = %chat, error = %e, "Failed to register subscriber");
                "⚠️ Could not register this chat, please try again later.".to_string()
            }
        },
        BotCommand::Stop => match control.registry.remove(chat) {
            Ok(true) => {
                info!(subscriber = %chat, "Subscriber unregistered");
                "🔕 Unsubscribed. Send /start to resume alerts.".to_string()
            }
            Ok(false) => "This chat is not subscribed. Send /start to subscribe.".to_string(),
            Err(e) => {
                warn!(subscriber = %chat, error = %e, "Failed to unregister subscriber");
                "⚠️ Could not unsubscribe this chat, please try again later.".to_string()
            }
        },
        BotCommand::Help => command_help().to_string(),
    }
}

fn welcome_text(threshold_pct: f64, newly_registered: bool) -> String {
    let mut text = format!(
        "👋 Hi!\nI track Binance futures prices.\n\
         You will get a notice on moves of {threshold_pct}% or more.\n\
         Send /stop to unsubscribe."
    );
    if newly_registered {
        text.push_str("\n\n✅ Chat registered!");
    }
    text
}

/// Help text returned by `/help`.
#[must_use]
pub const fn command_help() -> &'static str {
    "📋 Commands\n\n\
    /start - 🔔 Subscribe to alerts\n\
    /stop - 🔕 Unsubscribe\n\
    /help - 📋 Show this message"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::registry::MemoryRegistry;

    fn control(registry: Arc<MemoryRegistry>) -> (SubscriptionControl, Arc<Notify>) {
        let notify = Arc::new(Notify::new());
        (
            SubscriptionControl::new(registry, notify.clone(), 3.0),
            notify,
        )
    }

    #[test]
    fn parse_known_commands() {
        assert_eq!(parse_command("/start").unwrap(), BotCommand::Start);
        assert_eq!(parse_command("/stop").unwrap(), BotCommand::Stop);
        assert_eq!(parse_command("/help").unwrap(), BotCommand::Help);
    }

    #[test]
    fn parse_command_with_bot_mention() {
        assert_eq!(
            parse_command("/start@tickwatch_bot").unwrap(),
            BotCommand::Start
        );
    }

    #[test]
    fn parse_start_button() {
        assert_eq!(parse_command("Start").unwrap(), BotCommand::Start);
        assert_eq!(parse_command("  Start ").unwrap(), BotCommand::Start);
    }

    #[test]
    fn parse_rejects_plain_text_and_unknown() {
        assert_eq!(parse_command("hello"), Err(CommandParseError::NotACommand));
        assert_eq!(parse_command("   "), Err(CommandParseError::NotACommand));
        assert_eq!(
            parse_command("/donate"),
            Err(CommandParseError::UnknownCommand("/donate".into()))
        );
    }

    #[tokio::test]
    async fn start_registers_and_signals_once() {
        let registry = Arc::new(MemoryRegistry::new());
        let (control, notify) = control(registry.clone());

        let reply = handle_command(BotCommand::Start, SubscriberId::new(42), &control);
        assert!(reply.contains("registered"));
        assert_eq!(registry.all(), vec![SubscriberId::new(42)]);

        // Permit was stored by notify_one, so this resolves immediately.
        tokio::time::timeout(std::time::Duration::from_millis(50), notify.notified())
            .await
            .expect("subscription signal");

        let again = handle_command(BotCommand::Start, SubscriberId::new(42), &control);
        assert!(!again.contains("registered"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn stop_removes_subscriber() {
        let registry = Arc::new(MemoryRegistry::with_subscribers([SubscriberId::new(7)]));
        let (control, _notify) = control(registry.clone());

        let reply = handle_command(BotCommand::Stop, SubscriberId::new(7), &control);
        assert!(reply.contains("Unsubscribed"));
        assert!(registry.is_empty());

        let reply = handle_command(BotCommand::Stop, SubscriberId::new(7), &control);
        assert!(reply.contains("not subscribed"));
    }

    #[test]
    fn help_lists_commands() {
        let registry = Arc::new(MemoryRegistry::new());
        let (control, _notify) = control(registry);
        let reply = handle_command(BotCommand::Help, SubscriberId::new(1), &control);
        for (cmd, _) in bot_commands() {
            assert!(reply.contains(&format!("/{cmd}")));
        }
    }
}
