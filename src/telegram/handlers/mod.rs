//! Telegram bot handlers and the teloxide handler tree
//!
//! The handlers themselves only know the core [`Update`](crate::core::Update) type, so the
//! same registry runs in production and in the integration tests.

mod callbacks;
mod commands;
mod messages;
mod schema;
mod types;

use std::sync::Arc;

use crate::core::error::AppResult;
use crate::core::registry::{handler_fn, HandlerRegistry};

pub use callbacks::MENU_CALLBACKS;
pub use commands::{InfoHandler, StartHandler, StatsHandler, HELP_TEXT};
pub use schema::schema;
pub use types::{HandlerDeps, OperatorOnly, ADMIN_ONLY_TEXT};

/// Builds the registry of every command, text and callback handler the bot serves.
pub fn build_registry(deps: &HandlerDeps) -> AppResult<HandlerRegistry> {
    let stats = OperatorOnly::wrap(deps.operator_id, Arc::new(StatsHandler::new(Arc::clone(&deps.users))));

    HandlerRegistry::new()
        .command("start", Arc::new(StartHandler::new(Arc::clone(&deps.users))))?
        .command("help", handler_fn(commands::help))?
        .command("about", handler_fn(commands::about))?
        .command("info", Arc::new(InfoHandler::new(Arc::clone(&deps.users))))?
        .command("stats", stats)?
        .command("contact", handler_fn(commands::contact))?
        .text(handler_fn(messages::echo))?
        .callbacks(&MENU_CALLBACKS, handler_fn(callbacks::menu))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::users::UserDirectory;

    #[test]
    fn test_registry_covers_published_commands() {
        let registry = build_registry(&HandlerDeps::new(Arc::new(UserDirectory::new()), None)).unwrap();
        assert_eq!(
            registry.commands(),
            vec!["about", "contact", "help", "info", "start", "stats"]
        );
        // six commands, free text, two callbacks
        assert_eq!(registry.len(), 9);
    }
}
