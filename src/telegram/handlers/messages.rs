//! Free-text handler

use crate::core::registry::HandlerResult;
use crate::core::update::{Reply, Update, UpdateKind};
use crate::core::utils::{truncate_chars, word_count};

/// Longest body echoed back; keeps the reply under Telegram's 4096 character limit
pub const MAX_ECHO_CHARS: usize = 3800;

/// Echoes the message back with a few statistics about it.
pub async fn echo(update: Update) -> HandlerResult {
    let UpdateKind::Text { body } = &update.kind else {
        return Ok(None);
    };

    log::info!("Echoed message from {}: {}", update.sender.log_name(), body);

    let response = format!(
        "📝 You said: {}\n\n📊 Message Info:\n• Length: {} characters\n• Words: {}\n• User: {}",
        truncate_chars(body, MAX_ECHO_CHARS),
        body.chars().count(),
        word_count(body),
        update.sender.display_name
    );
    Ok(Some(Reply::plain(response)))
}
