//! Telegram transport: maps bot commands onto the [`CommandRouter`] and
//! delivers its replies to the originating chat.

use crate::application::commands::{BotCommand, CommandRouter};
use crate::config::Config;
use crate::domain::access::RequesterId;
use crate::domain::ports::ReplySink;
use crate::domain::reply::Reply;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{InputFile, KeyboardButton, KeyboardMarkup};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, warn};

#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Команды Bitcoin Pulse:")]
pub enum TelegramCommand {
    #[command(description = "запуск и меню")]
    Start,
    #[command(description = "текущая цена BTC")]
    Price,
    #[command(description = "график: свечи, Bollinger, SMA, RSI, объёмы")]
    Chart,
    #[command(description = "список команд")]
    Help,
}

impl From<TelegramCommand> for BotCommand {
    fn from(command: TelegramCommand) -> Self {
        match command {
            TelegramCommand::Start => BotCommand::Start,
            TelegramCommand::Price => BotCommand::Price,
            TelegramCommand::Chart => BotCommand::Chart,
            TelegramCommand::Help => BotCommand::Help,
        }
    }
}

/// Replies into a single chat.
pub struct TelegramReplySink {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramReplySink {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl ReplySink for TelegramReplySink {
    async fn deliver(&self, reply: Reply) -> Result<()> {
        match reply {
            Reply::Text(text) => {
                self.bot.send_message(self.chat_id, text).await?;
            }
            Reply::Menu { text, keyboard } => {
                let markup = KeyboardMarkup::new(
                    keyboard
                        .into_iter()
                        .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>()),
                )
                .resize_keyboard();
                self.bot
                    .send_message(self.chat_id, text)
                    .reply_markup(markup)
                    .await?;
            }
            Reply::Photo { path } => {
                self.bot
                    .send_photo(self.chat_id, InputFile::file(path))
                    .await?;
            }
        }
        Ok(())
    }
}

/// Long-polls Telegram until Ctrl+C.
pub async fn run(config: &Config, router: Arc<CommandRouter>) -> Result<()> {
    let bot = Bot::new(config.bot.token.clone());

    // The command menu is cosmetic; commands still work without it
    if let Err(e) = bot.set_my_commands(TelegramCommand::bot_commands()).await {
        warn!("Telegram: failed to register command list: {}", e);
    }

    let handler = Update::filter_message()
        .filter_command::<TelegramCommand>()
        .endpoint(handle_command);

    info!(
        "Telegram: listening for commands (owner {})",
        router.guard().owner()
    );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router])
        .default_handler(|upd| async move {
            debug!("Telegram: ignoring update {:?}", upd.id);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Telegram: listener stopped");
    Ok(())
}

async fn handle_command(
    bot: Bot,
    upd: Update,
    msg: Message,
    command: TelegramCommand,
    router: Arc<CommandRouter>,
) -> ResponseResult<()> {
    let requester = upd.from().map(|user| RequesterId(user.id.0));
    let sink = TelegramReplySink::new(bot, msg.chat.id);

    router.handle(requester, command.into(), &sink).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_parse_lowercase() {
        assert_eq!(
            TelegramCommand::parse("/price", "pulse_bot").unwrap(),
            TelegramCommand::Price
        );
        assert_eq!(
            TelegramCommand::parse("/chart@pulse_bot", "pulse_bot").unwrap(),
            TelegramCommand::Chart
        );
        assert!(TelegramCommand::parse("/volume", "pulse_bot").is_err());
    }

    #[test]
    fn test_command_list_covers_router_commands() {
        let names: Vec<String> = TelegramCommand::bot_commands()
            .into_iter()
            .map(|c| format!("/{}", c.command.trim_start_matches('/')))
            .collect();
        let expected: Vec<String> = BotCommand::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_into_router_command() {
        assert_eq!(BotCommand::from(TelegramCommand::Start), BotCommand::Start);
        assert_eq!(BotCommand::from(TelegramCommand::Help), BotCommand::Help);
    }
}
