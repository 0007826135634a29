use thiserror::Error;

/// Centralized error types for the application
///
/// Only `Configuration` and `DuplicateKey` are allowed to stop the process, and both
/// happen before the dispatch loop starts. Everything else is recovered where it occurs.
///
/// # Example
///
/// ```no_run
/// use foliobot::core::error::AppError;
///
/// fn report(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid startup configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A route key was registered twice
    #[error("Duplicate handler key: {0}")]
    DuplicateKey(String),

    /// A handler returned an error or panicked
    #[error(transparent)]
    HandlerFault(#[from] HandlerFault),

    /// Activity log read/write errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Operator notification failed
    #[error("Notification error: {0}")]
    Notify(String),

    /// JSON encode/decode errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A line of the activity log could not be parsed
    #[error("Corrupt activity log line {line}: {reason}")]
    CorruptLog { line: usize, reason: String },

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Fault raised while a handler was running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Handler '{handler}' failed: {message}")]
pub struct HandlerFault {
    /// Rendered route key of the handler that failed
    pub handler: String,
    pub message: String,
}

impl HandlerFault {
    pub fn new(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            message: message.into(),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_fault_display_names_handler() {
        let fault = HandlerFault::new("about", "boom");
        assert_eq!(fault.to_string(), "Handler 'about' failed: boom");

        let err: AppError = fault.into();
        assert!(matches!(err, AppError::HandlerFault(_)));
        assert_eq!(err.to_string(), "Handler 'about' failed: boom");
    }

    #[test]
    fn test_configuration_error_message() {
        let err = AppError::Configuration("TELEGRAM_BOT_TOKEN is not set".to_string());
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }
}
