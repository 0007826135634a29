//! Failure boundary around handler invocations
//!
//! A handler may return an error or panic; both become a [`HandlerFault`] and never
//! reach the dispatch loop. The operator can optionally be told about faults; that
//! notification is fire-and-forget and its own failure is only logged.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;

use crate::core::error::{AppResult, HandlerFault};
use crate::core::registry::Resolved;
use crate::core::update::{Reply, Update};

/// Best-effort delivery of a message to the operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, operator_id: i64, message: &str) -> AppResult<()>;
}

#[derive(Clone, Default)]
pub struct FailureBoundary {
    notifier: Option<Arc<dyn Notifier>>,
    operator_id: Option<i64>,
}

impl FailureBoundary {
    /// Boundary that only converts faults, without notifying anyone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Boundary that also reports faults to `operator_id`.
    ///
    /// `None` disables notification without error.
    pub fn with_notifier(notifier: Arc<dyn Notifier>, operator_id: Option<i64>) -> Self {
        Self {
            notifier: Some(notifier),
            operator_id,
        }
    }

    /// Runs the handler and catches anything it raises.
    pub async fn invoke(&self, resolved: &Resolved, update: &Update) -> Result<Option<Reply>, HandlerFault> {
        let handler_name = resolved.key.to_string();
        let outcome = AssertUnwindSafe(resolved.handler.handle(update)).catch_unwind().await;

        let fault = match outcome {
            Ok(Ok(reply)) => return Ok(reply),
            Ok(Err(err)) => HandlerFault::new(handler_name, err.to_string()),
            Err(payload) => HandlerFault::new(handler_name, format!("panicked: {}", panic_message(payload.as_ref()))),
        };

        log::error!(
            "Exception while handling an update from user {}: {}",
            update.sender.id,
            fault
        );
        self.report(&fault);
        Err(fault)
    }

    /// Spawns the operator notification; never waits for it and never fails.
    fn report(&self, fault: &HandlerFault) {
        let (Some(notifier), Some(operator_id)) = (self.notifier.clone(), self.operator_id) else {
            return;
        };

        let message = format!("⚠️ Bot Error:\n{}", fault);
        tokio::spawn(async move {
            // A failed notification is only worth a local warning.
            if let Err(e) = notifier.notify(operator_id, &message).await {
                log::warn!("Failed to notify operator {}: {}", operator_id, e);
            }
        });
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
