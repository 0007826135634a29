//! Handler dependencies and the operator-only wrapper

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::registry::{Handler, HandlerResult};
use crate::core::update::{Reply, Update};
use crate::core::users::UserDirectory;

/// Reply sent when someone other than the operator calls an operator command
pub const ADMIN_ONLY_TEXT: &str = "⚠️ This command is for admin only.";

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub users: Arc<UserDirectory>,
    pub operator_id: Option<i64>,
}

impl HandlerDeps {
    pub fn new(users: Arc<UserDirectory>, operator_id: Option<i64>) -> Self {
        Self { users, operator_id }
    }
}

/// Runs `inner` only for the configured operator.
///
/// Without a configured operator nobody passes the check.
pub struct OperatorOnly {
    operator_id: Option<i64>,
    inner: Arc<dyn Handler>,
}

impl OperatorOnly {
    pub fn wrap(operator_id: Option<i64>, inner: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(Self { operator_id, inner })
    }
}

#[async_trait]
impl Handler for OperatorOnly {
    async fn handle(&self, update: &Update) -> HandlerResult {
        if self.operator_id != Some(update.sender.id) {
            log::info!("Denied operator command for user {}", update.sender.id);
            return Ok(Some(Reply::plain(ADMIN_ONLY_TEXT)));
        }
        self.inner.handle(update).await
    }
}
