//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - The panic hook that keeps panics visible in the diagnostic log
//! - A startup banner describing the effective configuration

use anyhow::Result;
use simplelog::*;
use std::fs::OpenOptions;

use crate::core::config::BotSettings;

/// Initialize logger for both console and file output
///
/// The file is opened in append mode so restarts keep the previous diagnostics.
///
/// # Arguments
/// * `log_file_path` - Path to the diagnostic log file
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", log_file_path, e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Routes panics through the logger before the default unwinding continues.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));
}

/// Logs the effective configuration once at startup.
pub fn log_startup_configuration(settings: &BotSettings, activity_log_path: &str) {
    log::info!("🤖 Bot is starting...");
    match settings.operator_id {
        Some(id) => log::info!("👤 Admin ID: {}", id),
        None => log::info!("👤 Admin ID: Not set (error notifications disabled)"),
    }
    log::info!("📝 Activity is being saved to {}", activity_log_path);
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_init_logger_keeps_existing_content() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "previous run").unwrap();
        let path = temp_file.path().to_str().unwrap();

        // Another test in this binary may have installed the global logger already, so
        // only the file handling is checked here.
        let _ = init_logger(path);

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.starts_with("previous run\n"));
    }

    #[test]
    fn test_init_logger_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("app.log");
        let result = init_logger(path.to_str().unwrap());
        assert!(result.is_err());
    }
}
