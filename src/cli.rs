use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "foliobot")]
#[command(author, version, about = "Telegram bot with a pluggable handler core and an activity log", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Print a summary of the activity log
    Stats {
        /// Path to the activity log (defaults to ACTIVITY_LOG_PATH)
        #[arg(short, long)]
        log: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
