use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use std::time::Duration;

use crate::core::error::{AppError, AppResult};

/// Environment variables checked for the bot token, in priority order
pub const TOKEN_VARS: [&str; 3] = ["TELEGRAM_BOT_TOKEN", "BOT_TOKEN", "TELOXIDE_TOKEN"];

/// Environment variable holding the operator's Telegram user id
pub const ADMIN_ID_VAR: &str = "ADMIN_ID";

/// Diagnostic log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: foliobot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "foliobot.log".to_string()));

/// Activity log path (one JSON object per line)
/// Read from ACTIVITY_LOG_PATH environment variable
/// Default: bot_log.json
pub static ACTIVITY_LOG_PATH: Lazy<String> =
    Lazy::new(|| env::var("ACTIVITY_LOG_PATH").unwrap_or_else(|_| "bot_log.json".to_string()));

/// Custom Bot API server URL (local telegram-bot-api)
/// Read from BOT_API_URL environment variable
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("BOT_API_URL").ok());

/// Activity log configuration
pub mod activity {
    use once_cell::sync::Lazy;
    use std::env;

    /// Default number of characters of user text embedded into an action
    pub const DEFAULT_PREVIEW_CHARS: usize = 20;

    /// Maximum number of characters of user text embedded into an action
    /// Read from ACTION_PREVIEW_CHARS environment variable
    pub static PREVIEW_CHARS: Lazy<usize> = Lazy::new(|| {
        env::var("ACTION_PREVIEW_CHARS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PREVIEW_CHARS)
    });
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Timeout for Bot API requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Bot API request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Public links shown by /start, /about and /contact
pub mod links {
    use once_cell::sync::Lazy;
    use std::env;

    fn link(var: &str, default: &str) -> String {
        env::var(var)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// Read from GITHUB_URL environment variable
    pub static GITHUB: Lazy<String> = Lazy::new(|| link("GITHUB_URL", "https://github.com/foliobot"));

    /// Read from SOURCE_URL environment variable
    pub static SOURCE: Lazy<String> = Lazy::new(|| link("SOURCE_URL", "https://github.com/foliobot/foliobot"));

    /// Read from CONTACT_EMAIL environment variable
    pub static EMAIL: Lazy<String> = Lazy::new(|| link("CONTACT_EMAIL", "hello@foliobot.dev"));

    /// Read from TELEGRAM_CONTACT environment variable (without the `@`)
    pub static TELEGRAM: Lazy<String> = Lazy::new(|| link("TELEGRAM_CONTACT", "foliobot_support"));
}

/// Validated startup settings.
///
/// Built once in `main`; a missing token is fatal and the bot refuses to start.
#[derive(Clone, PartialEq, Eq)]
pub struct BotSettings {
    pub token: String,
    pub operator_id: Option<i64>,
}

impl BotSettings {
    /// Reads settings from the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = TOKEN_VARS
            .iter()
            .filter_map(|key| lookup(key))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .ok_or_else(|| AppError::Configuration(format!("{} is not set", TOKEN_VARS[0])))?;

        let operator_id = match lookup(ADMIN_ID_VAR).map(|raw| raw.trim().to_string()) {
            None => None,
            Some(raw) if raw.is_empty() => None,
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| AppError::Configuration(format!("{} must be a numeric user id, got '{}'", ADMIN_ID_VAR, raw)))?,
            ),
        };

        Ok(Self { token, operator_id })
    }
}

impl fmt::Debug for BotSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotSettings")
            .field("token", &"<redacted>")
            .field("operator_id", &self.operator_id)
            .finish()
    }
}
