//! Update dispatcher
//!
//! One call to [`Dispatcher::handle`] classifies the update, runs at most one handler
//! inside the [`FailureBoundary`], hands any reply to the transport and appends exactly
//! one [`ActivityEvent`]. Nothing that happens during a single update can stop the next
//! one from being dispatched.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::activity::{ActivityEvent, ActivityLog};
use crate::core::boundary::FailureBoundary;
use crate::core::config::activity::DEFAULT_PREVIEW_CHARS;
use crate::core::error::{AppResult, HandlerFault};
use crate::core::registry::{HandlerRegistry, RouteKey};
use crate::core::update::{Reply, Update, UpdateKind};
use crate::core::utils::truncate_chars;

/// Transport side that delivers replies back to the originating chat.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn deliver(&self, update: &Update, reply: &Reply) -> AppResult<()>;
}

/// Result of one dispatch, used to choose the recorded action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled(Option<Reply>),
    Unhandled,
    Failed(HandlerFault),
}

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    boundary: FailureBoundary,
    activity: ActivityLog,
    sink: Option<Arc<dyn ReplySink>>,
    preview_chars: usize,
}

impl Dispatcher {
    pub fn new(registry: Arc<HandlerRegistry>, boundary: FailureBoundary, activity: ActivityLog) -> Self {
        Self {
            registry,
            boundary,
            activity,
            sink: None,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReplySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Maximum number of characters of user text embedded into an action.
    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn classify(&self, update: &Update) -> RouteKey {
        RouteKey::classify(update)
    }

    /// Dispatches one update. Never fails: every error is recovered and logged here.
    pub async fn handle(&self, update: Update) -> DispatchOutcome {
        let key = self.classify(&update);
        log::debug!("Dispatching {:?} from user {}", key, update.sender.id);

        let outcome = match self.registry.resolve(&update) {
            None => DispatchOutcome::Unhandled,
            Some(resolved) => match self.boundary.invoke(&resolved, &update).await {
                Ok(reply) => DispatchOutcome::Handled(reply),
                Err(fault) => DispatchOutcome::Failed(fault),
            },
        };

        if let DispatchOutcome::Handled(Some(reply)) = &outcome {
            self.deliver(&update, reply).await;
        }

        let action = self.action_for(&key, &update, &outcome);
        self.record(&update, action).await;

        outcome
    }

    /// Action string recorded for an outcome.
    ///
    /// - handled command: the command name
    /// - handled text: `message:<preview>`
    /// - handled callback: `callback:<data>`
    /// - no handler: `unhandled:<preview of the raw text>`
    /// - handler fault: `error:<route key>`
    pub fn action_for(&self, key: &RouteKey, update: &Update, outcome: &DispatchOutcome) -> String {
        match outcome {
            DispatchOutcome::Failed(_) => format!("error:{}", key),
            DispatchOutcome::Unhandled => {
                format!("unhandled:{}", truncate_chars(&update.kind.raw_text(), self.preview_chars))
            }
            DispatchOutcome::Handled(_) => match &update.kind {
                UpdateKind::Command { name, .. } => name.clone(),
                UpdateKind::Text { body } => format!("message:{}", truncate_chars(body, self.preview_chars)),
                UpdateKind::CallbackQuery { data } => {
                    format!("callback:{}", truncate_chars(data, self.preview_chars))
                }
            },
        }
    }

    async fn deliver(&self, update: &Update, reply: &Reply) {
        let Some(sink) = &self.sink else {
            return;
        };
        if let Err(e) = sink.deliver(update, reply).await {
            log::error!("Failed to deliver reply to chat {}: {}", update.chat_id, e);
        }
    }

    /// Appends the event; a write failure goes to the diagnostic log and nowhere else.
    async fn record(&self, update: &Update, action: String) {
        let event = ActivityEvent::now(update.sender.id, update.sender.log_name(), action);
        if let Err(e) = self.activity.append(&event).await {
            log::error!(
                "Error saving activity to {}: {} (event: user={} action={})",
                self.activity.path().display(),
                e,
                event.user_id,
                event.action
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::activity::read_events;
    use crate::core::registry::{handler_fn, HandlerResult};
    use crate::core::update::Sender;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<(i64, String)>>,
    }

    #[async_trait]
    impl ReplySink for RecordingSink {
        async fn deliver(&self, update: &Update, reply: &Reply) -> AppResult<()> {
            self.delivered
                .lock()
                .map_err(|_| crate::core::error::AppError::Notify("poisoned".into()))?
                .push((update.chat_id, reply.text.clone()));
            Ok(())
        }
    }

    async fn dispatcher_with(registry: HandlerRegistry) -> (Dispatcher, Arc<RecordingSink>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let activity = ActivityLog::open(dir.path().join("bot_log.json")).await.unwrap();
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = Dispatcher::new(Arc::new(registry), FailureBoundary::new(), activity)
            .with_sink(Arc::clone(&sink) as Arc<dyn ReplySink>);
        (dispatcher, sink, dir)
    }

    fn ann() -> Sender {
        Sender::new(1, "Ann")
    }

    #[tokio::test]
    async fn test_handled_command_records_name_and_delivers() {
        let registry = HandlerRegistry::new()
            .command("start", handler_fn(|_u| async { HandlerResult::Ok(Some(Reply::plain("welcome"))) }))
            .unwrap();
        let (dispatcher, sink, dir) = dispatcher_with(registry).await;

        let outcome = dispatcher.handle(Update::command(ann(), "start", &[])).await;
        assert_eq!(outcome, DispatchOutcome::Handled(Some(Reply::plain("welcome"))));

        let events = read_events(dir.path().join("bot_log.json")).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user_id, 1);
        assert_eq!(events[0].username, "Ann");
        assert_eq!(events[0].action, "start");
        assert_eq!(sink.delivered.lock().unwrap().clone(), vec![(1, "welcome".to_string())]);
    }

    #[tokio::test]
    async fn test_handler_without_reply_sends_nothing() {
        let registry = HandlerRegistry::new()
            .callback("noop", handler_fn(|_u| async { HandlerResult::Ok(None) }))
            .unwrap();
        let (dispatcher, sink, dir) = dispatcher_with(registry).await;

        let outcome = dispatcher.handle(Update::callback(ann(), "noop")).await;
        assert_eq!(outcome, DispatchOutcome::Handled(None));
        assert!(sink.delivered.lock().unwrap().is_empty());

        let events = read_events(dir.path().join("bot_log.json")).await.unwrap();
        assert_eq!(events[0].action, "callback:noop");
    }

    #[tokio::test]
    async fn test_action_truncates_long_text() {
        let (dispatcher, _sink, _dir) = dispatcher_with(HandlerRegistry::new()).await;
        let dispatcher = dispatcher.with_preview_chars(5);
        let update = Update::text(ann(), "hello world");

        let action = dispatcher.action_for(&RouteKey::Text, &update, &DispatchOutcome::Unhandled);
        assert_eq!(action, "unhandled:hello...");

        let handled = dispatcher.action_for(&RouteKey::Text, &update, &DispatchOutcome::Handled(None));
        assert_eq!(handled, "message:hello...");
    }

    #[tokio::test]
    async fn test_unhandled_command_uses_raw_text() {
        let (dispatcher, _sink, dir) = dispatcher_with(HandlerRegistry::new()).await;

        let outcome = dispatcher.handle(Update::command(ann(), "nope", &["x"])).await;
        assert_eq!(outcome, DispatchOutcome::Unhandled);

        let events = read_events(dir.path().join("bot_log.json")).await.unwrap();
        assert_eq!(events[0].action, "unhandled:/nope x");
    }

    #[tokio::test]
    async fn test_failed_text_handler_records_text_key() {
        let registry = HandlerRegistry::new()
            .text(handler_fn(|_u| async { HandlerResult::Err("boom".into()) }))
            .unwrap();
        let (dispatcher, sink, dir) = dispatcher_with(registry).await;

        let outcome = dispatcher.handle(Update::text(ann(), "hi")).await;
        assert!(matches!(outcome, DispatchOutcome::Failed(ref f) if f.handler == "text"));
        assert!(sink.delivered.lock().unwrap().is_empty());

        let events = read_events(dir.path().join("bot_log.json")).await.unwrap();
        assert_eq!(events[0].action, "error:text");
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_log_write_failure_does_not_stop_dispatch() {
        // Every write to /dev/full fails with ENOSPC.
        let activity = ActivityLog::open("/dev/full").await.unwrap();
        let event = ActivityEvent::now(1, "Ann", "start");
        assert!(activity.append(&event).await.is_err());

        let registry = HandlerRegistry::new()
            .command("start", handler_fn(|_u| async { HandlerResult::Ok(Some(Reply::plain("hi"))) }))
            .unwrap();
        let dispatcher = Dispatcher::new(Arc::new(registry), FailureBoundary::new(), activity);

        for _ in 0..2 {
            let outcome = dispatcher.handle(Update::command(ann(), "start", &[])).await;
            assert_eq!(outcome, DispatchOutcome::Handled(Some(Reply::plain("hi"))));
        }
    }
}
