//! Handler registry: route key → handler
//!
//! Built once at startup and shared read-only afterwards. Classification of an update
//! into a [`RouteKey`] is a closed match; lookup is a plain hash map.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::{AppError, AppResult};
use crate::core::update::{Reply, Update, UpdateKind};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What a handler produces: zero or one reply.
pub type HandlerResult = Result<Option<Reply>, HandlerError>;

/// Routing key derived from an update.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteKey {
    /// Exact, case-sensitive command name without the leading `/`
    Command(String),
    /// The single reserved key for free text
    Text,
    /// Exact callback payload
    Callback(String),
}

impl RouteKey {
    /// Classifies an update. Every update maps to exactly one key.
    pub fn classify(update: &Update) -> Self {
        match &update.kind {
            UpdateKind::Command { name, .. } => RouteKey::Command(name.clone()),
            UpdateKind::Text { .. } => RouteKey::Text,
            UpdateKind::CallbackQuery { data } => RouteKey::Callback(data.clone()),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKey::Command(name) => f.write_str(name),
            RouteKey::Text => f.write_str("text"),
            RouteKey::Callback(data) => f.write_str(data),
        }
    }
}

/// A capability that consumes an update and optionally produces a reply.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, update: &Update) -> HandlerResult;
}

/// Adapter turning an async closure into a [`Handler`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Update) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn handle(&self, update: &Update) -> HandlerResult {
        (self.0)(update.clone()).await
    }
}

/// Wraps an async closure taking an owned [`Update`].
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(Update) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Handler resolved for one update, together with the key it was found under.
#[derive(Clone)]
pub struct Resolved {
    pub key: RouteKey,
    pub handler: Arc<dyn Handler>,
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<RouteKey, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler; a key can only be registered once.
    pub fn register(&mut self, key: RouteKey, handler: Arc<dyn Handler>) -> AppResult<()> {
        if self.handlers.contains_key(&key) {
            return Err(AppError::DuplicateKey(format!("{:?}", key)));
        }
        self.handlers.insert(key, handler);
        Ok(())
    }

    pub fn command(mut self, name: &str, handler: Arc<dyn Handler>) -> AppResult<Self> {
        self.register(RouteKey::Command(name.to_string()), handler)?;
        Ok(self)
    }

    pub fn text(mut self, handler: Arc<dyn Handler>) -> AppResult<Self> {
        self.register(RouteKey::Text, handler)?;
        Ok(self)
    }

    pub fn callback(mut self, data: &str, handler: Arc<dyn Handler>) -> AppResult<Self> {
        self.register(RouteKey::Callback(data.to_string()), handler)?;
        Ok(self)
    }

    /// Registers one handler for every callback value in a set known at startup.
    pub fn callbacks(mut self, values: &[&str], handler: Arc<dyn Handler>) -> AppResult<Self> {
        for data in values {
            self.register(RouteKey::Callback(data.to_string()), Arc::clone(&handler))?;
        }
        Ok(self)
    }

    pub fn resolve(&self, update: &Update) -> Option<Resolved> {
        let key = RouteKey::classify(update);
        self.handlers
            .get(&key)
            .map(|handler| Resolved {
                key,
                handler: Arc::clone(handler),
            })
    }

    /// Registered command names, sorted.
    pub fn commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .keys()
            .filter_map(|key| match key {
                RouteKey::Command(name) => Some(name.clone()),
                _ => None,
            })
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::update::Sender;

    fn constant(text: &'static str) -> Arc<dyn Handler> {
        handler_fn(move |_update| async move { HandlerResult::Ok(Some(Reply::plain(text))) })
    }

    fn ann() -> Sender {
        Sender::new(1, "Ann")
    }

    #[tokio::test]
    async fn test_resolve_returns_registered_handler() {
        let registry = HandlerRegistry::new()
            .command("start", constant("start"))
            .unwrap()
            .command("help", constant("help"))
            .unwrap()
            .callback("about", constant("about"))
            .unwrap()
            .text(constant("echo"))
            .unwrap();

        let cases = [
            (Update::command(ann(), "start", &[]), RouteKey::Command("start".into()), "start"),
            (Update::command(ann(), "help", &["x"]), RouteKey::Command("help".into()), "help"),
            (Update::callback(ann(), "about"), RouteKey::Callback("about".into()), "about"),
            (Update::text(ann(), "anything"), RouteKey::Text, "echo"),
        ];

        for (update, expected_key, expected_text) in cases {
            let resolved = registry.resolve(&update).unwrap();
            assert_eq!(resolved.key, expected_key);
            let reply = resolved.handler.handle(&update).await.unwrap().unwrap();
            assert_eq!(reply.text, expected_text);
        }
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(RouteKey::Command("start".into()), constant("a"))
            .unwrap();
        let err = registry
            .register(RouteKey::Command("start".into()), constant("b"))
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateKey(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_text_key_rejected() {
        let result = HandlerRegistry::new().text(constant("a")).unwrap().text(constant("b"));
        assert!(matches!(result, Err(AppError::DuplicateKey(_))));
    }

    #[test]
    fn test_no_prefix_or_case_insensitive_matching() {
        let registry = HandlerRegistry::new()
            .command("start", constant("start"))
            .unwrap()
            .callback("about", constant("about"))
            .unwrap();

        assert!(registry.resolve(&Update::command(ann(), "Start", &[])).is_none());
        assert!(registry.resolve(&Update::command(ann(), "star", &[])).is_none());
        assert!(registry.resolve(&Update::callback(ann(), "about_more")).is_none());
        assert!(registry.resolve(&Update::text(ann(), "start")).is_none());
    }

    #[test]
    fn test_command_and_callback_with_same_name_are_distinct() {
        let registry = HandlerRegistry::new()
            .command("about", constant("cmd"))
            .unwrap()
            .callback("about", constant("cb"))
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_callbacks_registers_value_set() {
        let registry = HandlerRegistry::new()
            .callbacks(&["about", "commands"], constant("menu"))
            .unwrap();
        assert!(registry.resolve(&Update::callback(ann(), "about")).is_some());
        assert!(registry.resolve(&Update::callback(ann(), "commands")).is_some());
        assert!(registry.resolve(&Update::callback(ann(), "contact")).is_none());

        let clash = HandlerRegistry::new().callbacks(&["about", "about"], constant("menu"));
        assert!(matches!(clash, Err(AppError::DuplicateKey(_))));
    }

    #[test]
    fn test_commands_listing_is_sorted() {
        let registry = HandlerRegistry::new()
            .command("stats", constant(""))
            .unwrap()
            .command("about", constant(""))
            .unwrap()
            .callback("x", constant(""))
            .unwrap();
        assert_eq!(registry.commands(), vec!["about".to_string(), "stats".to_string()]);
    }

    #[test]
    fn test_route_key_display() {
        assert_eq!(RouteKey::Command("start".into()).to_string(), "start");
        assert_eq!(RouteKey::Text.to_string(), "text");
        assert_eq!(RouteKey::Callback("about".into()).to_string(), "about");
    }
}
