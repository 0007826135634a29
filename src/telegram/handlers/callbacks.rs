//! Inline keyboard callbacks; each one rewrites the message carrying the keyboard

use indoc::indoc;

use crate::core::registry::HandlerResult;
use crate::core::update::{Reply, Update, UpdateKind};

/// Callback payloads produced by our own keyboards
pub const MENU_CALLBACKS: [&str; 2] = ["about", "commands"];

const ABOUT_TEXT: &str = indoc! {"
    ℹ️ <b>About This Bot</b>

    A small bot showing commands, inline keyboards, callback queries and an activity log \
    built on a pluggable handler core.
"};

const COMMANDS_TEXT: &str = indoc! {"
    🛠️ <b>Available Commands</b>

    /start - Start the bot
    /help - Show help
    /about - About project
    /info - User info
    /stats - Statistics
    /contact - Contact info
"};

pub async fn menu(update: Update) -> HandlerResult {
    let UpdateKind::CallbackQuery { data } = &update.kind else {
        return Ok(None);
    };

    let text = match data.as_str() {
        "about" => ABOUT_TEXT,
        "commands" => COMMANDS_TEXT,
        other => return Err(format!("unknown menu callback '{}'", other).into()),
    };
    Ok(Some(Reply::html(text).editing_origin()))
}
