//! Telegram bot integration: teloxide adapter, reply sink and handlers

pub mod bot;
pub mod convert;
pub mod handlers;
pub mod sink;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{build_registry, schema, HandlerDeps};
pub use sink::{TelegramNotifier, TelegramSink};
