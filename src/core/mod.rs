//! Dispatch core, activity logging, configuration and common utilities

pub mod activity;
pub mod boundary;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod registry;
pub mod update;
pub mod users;
pub mod utils;

// Re-exports for convenience
pub use activity::{ActivityEvent, ActivityLog, ActivitySummary};
pub use boundary::{FailureBoundary, Notifier};
pub use dispatcher::{DispatchOutcome, Dispatcher, ReplySink};
pub use error::{AppError, AppResult, HandlerFault};
pub use logging::{init_logger, install_panic_hook, log_startup_configuration};
pub use registry::{handler_fn, Handler, HandlerError, HandlerRegistry, HandlerResult, RouteKey};
pub use update::{Button, Keyboard, Reply, Sender, Update, UpdateKind};
pub use users::UserDirectory;
