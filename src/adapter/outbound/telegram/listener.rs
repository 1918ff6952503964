//! Inbound command listener.

use teloxide::prelude::*;
use teloxide::types::{BotCommand as MenuCommand, KeyboardButton, KeyboardMarkup};
use tracing::{debug, error, info, warn};

use super::command::{bot_commands, handle_command, parse_command, SubscriptionControl, START_BUTTON};
use crate::domain::id::SubscriberId;

/// Long-poll Telegram for commands until the process exits.
///
/// Replies to `/start`, `/stop`, `/help` and the `Start` button. Other
/// messages are ignored.
pub async fn run_command_listener(bot: Bot, control: SubscriptionControl) {
    if let Err(e) = register_bot_commands(&bot).await {
        warn!(error = %e, "Failed to register bot commands with Telegram");
    }

    info!("Telegram command listener started");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let control = control.clone();
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };

            match parse_command(text) {
                Ok(command) => {
                    let reply = handle_command(command, SubscriberId::new(msg.chat.id.0), &control);
                    if let Err(e) = bot
                        .send_message(msg.chat.id, reply)
                        .reply_markup(start_keyboard())
                        .await
                    {
                        error!(error = %e, "Failed to send Telegram command response");
                    }
                }
                Err(e) => debug!(chat = msg.chat.id.0, reason = %e, "Ignoring message"),
            }

            respond(())
        }
    })
    .await;

    warn!("Telegram command listener stopped");
}

fn start_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(START_BUTTON)]])
}

/// Register bot commands with Telegram for the "/" menu.
async fn register_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<MenuCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| MenuCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    info!("Registered bot commands with Telegram");
    Ok(())
}
