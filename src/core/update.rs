//! Transport-independent update and reply types
//!
//! The Telegram adapter converts teloxide updates into [`Update`] and renders
//! [`Reply`] back into Bot API calls. Nothing in here knows about teloxide.

/// What kind of inbound event this is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    /// `/name arg1 arg2`
    Command { name: String, args: Vec<String> },
    /// Free text that is not a command
    Text { body: String },
    /// Inline keyboard button press
    CallbackQuery { data: String },
}

impl UpdateKind {
    /// The text the user actually produced, as it would appear in a chat.
    pub fn raw_text(&self) -> String {
        match self {
            UpdateKind::Command { name, args } if args.is_empty() => format!("/{}", name),
            UpdateKind::Command { name, args } => format!("/{} {}", name, args.join(" ")),
            UpdateKind::Text { body } => body.clone(),
            UpdateKind::CallbackQuery { data } => data.clone(),
        }
    }
}

/// Who sent the update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: i64,
    pub display_name: String,
    /// `@handle` without the `@`
    pub handle: Option<String>,
    pub language_code: Option<String>,
}

impl Sender {
    pub fn new(id: i64, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            handle: None,
            language_code: None,
        }
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    /// Name recorded in the activity log: the handle if present, else the display name.
    pub fn log_name(&self) -> &str {
        self.handle.as_deref().unwrap_or(&self.display_name)
    }
}

/// One inbound event, immutable for the lifetime of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub kind: UpdateKind,
    pub sender: Sender,
    pub chat_id: i64,
    /// Message the update came from (for callbacks: the message carrying the keyboard)
    pub message_id: Option<i32>,
}

impl Update {
    /// Builds a command update in a private chat with the sender.
    pub fn command(sender: Sender, name: &str, args: &[&str]) -> Self {
        let chat_id = sender.id;
        Self {
            kind: UpdateKind::Command {
                name: name.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
            },
            sender,
            chat_id,
            message_id: None,
        }
    }

    /// Builds a free-text update in a private chat with the sender.
    pub fn text(sender: Sender, body: &str) -> Self {
        let chat_id = sender.id;
        Self {
            kind: UpdateKind::Text { body: body.to_string() },
            sender,
            chat_id,
            message_id: None,
        }
    }

    /// Builds a callback query update in a private chat with the sender.
    pub fn callback(sender: Sender, data: &str) -> Self {
        let chat_id = sender.id;
        Self {
            kind: UpdateKind::CallbackQuery { data: data.to_string() },
            sender,
            chat_id,
            message_id: None,
        }
    }
}

/// How reply text should be interpreted by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Plain,
    Html,
}

/// Where the reply goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyMode {
    /// New message in the originating chat
    #[default]
    Send,
    /// Replace the text of the originating message (falls back to `Send`)
    EditOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    Url { label: String, url: String },
    Callback { label: String, data: String },
}

impl Button {
    pub fn url(label: &str, url: &str) -> Self {
        Button::Url {
            label: label.to_string(),
            url: url.to_string(),
        }
    }

    pub fn callback(label: &str, data: &str) -> Self {
        Button::Callback {
            label: label.to_string(),
            data: data.to_string(),
        }
    }
}

/// Inline keyboard laid out as rows of buttons.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        self.rows.push(buttons);
        self
    }
}

/// Outbound message content handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub format: TextFormat,
    pub mode: ReplyMode,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            mode: ReplyMode::Send,
            keyboard: None,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            format: TextFormat::Html,
            ..Self::plain(text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn editing_origin(mut self) -> Self {
        self.mode = ReplyMode::EditOrigin;
        self
    }
}
