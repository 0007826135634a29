use anyhow::Result;
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::dispatching::Dispatcher as TeloxideDispatcher;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;

use foliobot::cli::{Cli, Commands};
use foliobot::core::activity::{read_events_lossy, ActivitySummary};
use foliobot::core::config::{self, BotSettings};
use foliobot::core::{init_logger, install_panic_hook, log_startup_configuration};
use foliobot::core::{ActivityLog, Dispatcher, FailureBoundary, Notifier, ReplySink, UserDirectory};
use foliobot::telegram::{
    build_registry, create_bot, schema, setup_bot_commands, HandlerDeps, TelegramNotifier, TelegramSink,
};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration, registry, activity log).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    match cli.command {
        Some(Commands::Stats { log }) => print_stats(log).await,
        Some(Commands::Run) | None => {
            install_panic_hook();
            init_logger(&config::LOG_FILE_PATH)?;
            run_bot().await
        }
    }
}

/// Prints a summary derived from the activity log.
async fn print_stats(log: Option<PathBuf>) -> Result<()> {
    let path = log.unwrap_or_else(|| PathBuf::from(config::ACTIVITY_LOG_PATH.as_str()));
    let (events, skipped) = read_events_lossy(&path).await?;
    if !skipped.is_empty() {
        eprintln!("⚠️ Skipped {} malformed line(s): {:?}", skipped.len(), skipped);
    }
    let summary = ActivitySummary::from_events(&events);

    println!("📊 Activity in {}", path.display());
    println!("Events:       {}", summary.total_events);
    println!("Unique users: {}", summary.unique_users);
    println!("Unhandled:    {}", summary.unhandled);
    println!("Errors:       {}", summary.errors);
    if let (Some(first), Some(last)) = (summary.first_seen, summary.last_seen) {
        println!("Period:       {} .. {}", first.to_rfc3339(), last.to_rfc3339());
    }
    for (kind, count) in &summary.by_kind {
        println!("  {:<12} {}", kind, count);
    }
    Ok(())
}

async fn run_bot() -> Result<()> {
    // Refuses to start without a token
    let settings = BotSettings::from_env()?;
    log_startup_configuration(&settings, &config::ACTIVITY_LOG_PATH);

    let users = Arc::new(UserDirectory::new());
    let registry = build_registry(&HandlerDeps::new(Arc::clone(&users), settings.operator_id))?;
    log::info!("Registered {} handlers: commands {:?}", registry.len(), registry.commands());

    let activity = ActivityLog::open(config::ACTIVITY_LOG_PATH.as_str()).await?;
    let bot = create_bot(&settings)?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            log::info!("Logged in as @{}", me.user.username.as_deref().unwrap_or("unknown"));
            me.user.username.clone()
        }
        Err(e) => {
            log::warn!("Failed to fetch bot info, commands addressed to other bots will not be filtered: {}", e);
            None
        }
    };

    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(bot.clone()));
    let sink: Arc<dyn ReplySink> = Arc::new(TelegramSink::new(bot.clone()));
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        FailureBoundary::with_notifier(notifier, settings.operator_id),
        activity,
    )
    .with_sink(sink)
    .with_preview_chars(*config::activity::PREVIEW_CHARS);

    log::info!("✅ Bot is running! Press Ctrl+C to stop.");

    // Create polling listener that drops pending updates on start
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    TeloxideDispatcher::builder(bot, schema(dispatcher, bot_username))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Bot stopped");
    Ok(())
}
