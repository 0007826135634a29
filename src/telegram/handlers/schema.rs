//! Dispatcher schema: teloxide update tree feeding the core dispatcher

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::dptree;
use teloxide::prelude::Requester;
use teloxide::types::{CallbackQuery, Message, Update};
use teloxide::Bot;

use crate::core::dispatcher::Dispatcher;
use crate::core::registry::HandlerError;
use crate::telegram::convert::{update_from_callback, update_from_message};

/// Creates the handler tree used by teloxide's dispatcher.
///
/// Every branch converts the update and hands it to [`Dispatcher::handle`], which never
/// fails; the endpoints therefore always return `Ok(())`.
pub fn schema(dispatcher: Dispatcher, bot_username: Option<String>) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(message_handler(dispatcher.clone(), bot_username))
        .branch(callback_handler(dispatcher))
}

fn message_handler(dispatcher: Dispatcher, bot_username: Option<String>) -> UpdateHandler<HandlerError> {
    Update::filter_message().endpoint(move |msg: Message| {
        let dispatcher = dispatcher.clone();
        let bot_username = bot_username.clone();
        async move {
            match update_from_message(&msg, bot_username.as_deref()) {
                Some(update) => {
                    dispatcher.handle(update).await;
                }
                None => log::debug!("Skipping message {} in chat {}", msg.id.0, msg.chat.id),
            }
            Ok(())
        }
    })
}

fn callback_handler(dispatcher: Dispatcher) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let dispatcher = dispatcher.clone();
        async move {
            // Stops the client-side spinner; the reply itself is produced by the handler.
            if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                log::warn!("Failed to answer callback query {:?}: {}", q.id, e);
            }
            dispatcher.handle(update_from_callback(&q)).await;
            Ok(())
        }
    })
}
