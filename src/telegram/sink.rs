//! Renders core replies and operator notifications as Bot API calls

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};
use url::Url;

use crate::core::boundary::Notifier;
use crate::core::dispatcher::ReplySink;
use crate::core::error::{AppError, AppResult};
use crate::core::update::{Button, Keyboard, Reply, ReplyMode, TextFormat, Update};

/// Builds the teloxide inline keyboard for a core [`Keyboard`].
pub fn inline_keyboard(keyboard: &Keyboard) -> AppResult<InlineKeyboardMarkup> {
    let mut rows = Vec::with_capacity(keyboard.rows.len());
    for row in &keyboard.rows {
        let mut buttons = Vec::with_capacity(row.len());
        for button in row {
            buttons.push(match button {
                Button::Url { label, url } => {
                    let url = Url::parse(url)
                        .map_err(|e| AppError::Configuration(format!("Invalid button URL '{}': {}", url, e)))?;
                    InlineKeyboardButton::url(label.clone(), url)
                }
                Button::Callback { label, data } => InlineKeyboardButton::callback(label.clone(), data.clone()),
            });
        }
        rows.push(buttons);
    }
    Ok(InlineKeyboardMarkup::new(rows))
}

/// Delivers replies through the Bot API.
#[derive(Clone)]
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    async fn send(&self, chat_id: ChatId, reply: &Reply, markup: Option<InlineKeyboardMarkup>) -> AppResult<()> {
        let mut request = self.bot.send_message(chat_id, reply.text.clone());
        if reply.format == TextFormat::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(markup) = markup {
            request = request.reply_markup(markup);
        }
        request.await?;
        Ok(())
    }

    async fn edit(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        reply: &Reply,
        markup: Option<InlineKeyboardMarkup>,
    ) -> AppResult<()> {
        let mut request = self.bot.edit_message_text(chat_id, message_id, reply.text.clone());
        if reply.format == TextFormat::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(markup) = markup {
            request = request.reply_markup(markup);
        }
        request.await?;
        Ok(())
    }
}

#[async_trait]
impl ReplySink for TelegramSink {
    async fn deliver(&self, update: &Update, reply: &Reply) -> AppResult<()> {
        let chat_id = ChatId(update.chat_id);
        let markup = reply.keyboard.as_ref().map(inline_keyboard).transpose()?;

        match (reply.mode, update.message_id) {
            (ReplyMode::EditOrigin, Some(id)) => self.edit(chat_id, MessageId(id), reply, markup).await,
            (ReplyMode::EditOrigin, None) => {
                log::debug!("No origin message to edit in chat {}, sending instead", update.chat_id);
                self.send(chat_id, reply, markup).await
            }
            (ReplyMode::Send, _) => self.send(chat_id, reply, markup).await,
        }
    }
}

/// Sends fault notifications to the operator's private chat.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, operator_id: i64, message: &str) -> AppResult<()> {
        self.bot
            .send_message(ChatId(operator_id), message.to_string())
            .await
            .map_err(|e| AppError::Notify(e.to_string()))?;
        Ok(())
    }
}
