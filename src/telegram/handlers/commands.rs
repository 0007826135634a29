//! Command handlers: /start, /help, /about, /info, /stats, /contact

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use indoc::{formatdoc, indoc};
use teloxide::utils::html::escape;

use crate::core::config::links;
use crate::core::registry::{Handler, HandlerResult};
use crate::core::update::{Button, Keyboard, Reply, Update};
use crate::core::users::UserDirectory;
use crate::core::utils::format_uptime;

pub const HELP_TEXT: &str = indoc! {"
    📚 <b>Help Guide</b>

    <b>Basic Commands:</b>
    • /start - Start the bot
    • /help - Show this help message
    • /about - About this project
    • /info - Get your user information
    • /stats - Get bot statistics
    • /contact - Contact the developer

    <b>Features:</b>
    • Echo messages
    • User information
    • Button interactions
    • Activity logging
"};

fn start_keyboard() -> Keyboard {
    Keyboard::new()
        .row(vec![
            Button::url("📊 GitHub", &links::GITHUB),
            Button::url("📁 View Source", &links::SOURCE),
        ])
        .row(vec![
            Button::callback("ℹ️ About", "about"),
            Button::callback("🛠️ Commands", "commands"),
        ])
}

fn contact_keyboard() -> Keyboard {
    Keyboard::new()
        .row(vec![Button::url("🌐 GitHub Profile", &links::GITHUB)])
        .row(vec![Button::url("📁 View Source Code", &links::SOURCE)])
}

/// /start: greets the user and remembers them.
pub struct StartHandler {
    users: Arc<UserDirectory>,
}

impl StartHandler {
    pub fn new(users: Arc<UserDirectory>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Handler for StartHandler {
    async fn handle(&self, update: &Update) -> HandlerResult {
        let sender = &update.sender;
        if self.users.remember(sender) {
            log::info!("New user {} ({})", sender.log_name(), sender.id);
        }
        log::info!("User {} started the bot", sender.log_name());

        let text = formatdoc! {"
            🤖 Welcome {name}!

            I'm a small Telegram bot with a pluggable handler core.

            🚀 Available Commands:
            /start - Start the bot
            /help - Show help message
            /about - About this project
            /info - Get user info
            /stats - Get bot statistics
            /contact - Contact information

            📝 Try sending me a message or use the buttons below!
        ", name = escape(&sender.display_name)};

        Ok(Some(Reply::html(text).with_keyboard(start_keyboard())))
    }
}

pub async fn help(_update: Update) -> HandlerResult {
    Ok(Some(Reply::html(HELP_TEXT)))
}

pub async fn about(_update: Update) -> HandlerResult {
    let text = formatdoc! {"
        🤖 <b>foliobot</b>

        <b>Description:</b>
        A Telegram bot built on a small dispatch core: a handler registry, a failure
        boundary around every handler and an append-only activity log.

        <b>Tech Stack:</b>
        • Rust + tokio
        • teloxide
        • JSON lines activity log

        <b>Features Included:</b>
        ✅ Command handlers
        ✅ Message echo
        ✅ Inline keyboards
        ✅ Callback queries
        ✅ Error handling
        ✅ Activity logging

        <b>GitHub:</b> {github}
    ", github = escape(&links::GITHUB)};

    Ok(Some(Reply::html(text)))
}

/// /info: what Telegram told us about the sender.
pub struct InfoHandler {
    users: Arc<UserDirectory>,
}

impl InfoHandler {
    pub fn new(users: Arc<UserDirectory>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Handler for InfoHandler {
    async fn handle(&self, update: &Update) -> HandlerResult {
        let sender = &update.sender;
        let first_seen = self
            .users
            .get(sender.id)
            .map(|user| user.first_seen)
            .unwrap_or_else(Utc::now);

        let text = formatdoc! {"
            👤 <b>User Information</b>

            <b>ID:</b> <code>{id}</code>
            <b>Name:</b> {name}
            <b>Username:</b> @{handle}
            <b>Language:</b> {language}
            <b>Profile:</b> <a href=\"tg://user?id={id}\">Link</a>

            <b>First seen:</b> {first_seen}
        ",
            id = sender.id,
            name = escape(&sender.display_name),
            handle = escape(sender.handle.as_deref().unwrap_or("N/A")),
            language = escape(sender.language_code.as_deref().unwrap_or("N/A")),
            first_seen = first_seen.format("%Y-%m-%d %H:%M:%S"),
        };

        Ok(Some(Reply::html(text)))
    }
}

/// /stats: operator view of the in-memory counters. Wrapped in `OperatorOnly`.
pub struct StatsHandler {
    users: Arc<UserDirectory>,
}

impl StatsHandler {
    pub fn new(users: Arc<UserDirectory>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Handler for StatsHandler {
    async fn handle(&self, update: &Update) -> HandlerResult {
        let text = formatdoc! {"
            📊 <b>Bot Statistics</b>

            <b>Total Users:</b> {users}
            <b>Uptime:</b> {uptime}
            <b>Admin:</b> {admin}
        ",
            users = self.users.count(),
            uptime = format_uptime(self.users.uptime_secs()),
            admin = escape(&update.sender.display_name),
        };

        Ok(Some(Reply::html(text)))
    }
}

pub async fn contact(_update: Update) -> HandlerResult {
    let text = formatdoc! {"
        📞 <b>Contact Information</b>

        <b>GitHub:</b> {github}
        <b>Email:</b> {email}
        <b>Telegram:</b> @{telegram}

        <b>Project Repository:</b>
        {source}
    ",
        github = escape(&links::GITHUB),
        email = escape(&links::EMAIL),
        telegram = escape(&links::TELEGRAM),
        source = escape(&links::SOURCE),
    };

    Ok(Some(Reply::html(text).with_keyboard(contact_keyboard())))
}
