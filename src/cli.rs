use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `chatgate` - Telegram front end for chat-completion and image APIs.
#[derive(Parser, Debug)]
#[command(name = "chatgate")]
#[command(version)]
#[command(about = "Telegram bot with per-user conversation windows.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.chatgate/config.toml when it exists)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Commands {
    /// Start the bot (default)
    #[default]
    Run,

    /// Validate configuration and the access file, then print a redacted summary
    Check,
}
