//! teloxide → core conversions
//!
//! Only text messages and callback queries become core updates. Everything else (media,
//! service messages, edits) is not ours to dispatch.

use teloxide::types::{CallbackQuery, Message, User};

use crate::core::update::{Sender, Update, UpdateKind};

pub fn sender_from_user(user: &User) -> Sender {
    Sender {
        id: i64::try_from(user.id.0).unwrap_or(i64::MAX),
        display_name: user.first_name.clone(),
        handle: user.username.clone(),
        language_code: user.language_code.clone(),
    }
}

/// Splits `/name@bot arg1 arg2` into a command kind.
///
/// Returns `None` when the text is not a command, or when the command is explicitly
/// addressed to a different bot in a group chat.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<UpdateKind> {
    let rest = text.strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let head = parts.next()?;

    let name = match head.split_once('@') {
        Some((name, mention)) => match bot_username {
            Some(ours) if mention.eq_ignore_ascii_case(ours) => name,
            Some(_) => return None,
            None => name,
        },
        None => head,
    };
    if name.is_empty() {
        return None;
    }

    Some(UpdateKind::Command {
        name: name.to_string(),
        args: parts.map(str::to_string).collect(),
    })
}

/// Classifies message text: a command if it parses as one, otherwise free text.
fn kind_from_text(text: &str, bot_username: Option<&str>) -> Option<UpdateKind> {
    if text.starts_with('/') {
        return parse_command(text, bot_username);
    }
    Some(UpdateKind::Text { body: text.to_string() })
}

pub fn update_from_message(msg: &Message, bot_username: Option<&str>) -> Option<Update> {
    let text = msg.text()?;
    let sender = match msg.from.as_ref() {
        Some(user) => sender_from_user(user),
        None => Sender::new(msg.chat.id.0, msg.chat.first_name().unwrap_or("unknown")),
    };

    Some(Update {
        kind: kind_from_text(text, bot_username)?,
        sender,
        chat_id: msg.chat.id.0,
        message_id: Some(msg.id.0),
    })
}

pub fn update_from_callback(q: &CallbackQuery) -> Update {
    let sender = sender_from_user(&q.from);
    let (chat_id, message_id) = match q.message.as_ref() {
        Some(m) => (m.chat().id.0, Some(m.id().0)),
        None => (sender.id, None),
    };

    Update {
        kind: UpdateKind::CallbackQuery {
            data: q.data.clone().unwrap_or_default(),
        },
        sender,
        chat_id,
        message_id,
    }
}
