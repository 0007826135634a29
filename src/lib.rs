//! foliobot - Telegram bot built on a pluggable dispatch core
//!
//! # Module Structure
//!
//! - `core`: handler registry, dispatcher, failure boundary, activity log, configuration
//! - `telegram`: teloxide adapter, reply sink and the bot's handlers
//! - `cli`: command line interface of the binary

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod cli;
pub mod core;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult, DispatchOutcome, Dispatcher, HandlerRegistry};
