#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::FmtSubscriber;

mod app;
mod cli;

use chatgate::Config;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Both ring and aws-lc-rs may be compiled in; pick one explicitly.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let locale = config.apply_locale();
    tracing::debug!(locale = %locale, "reply locale selected");

    app::dispatch::dispatch(cli.command.unwrap_or_default(), config).await
}
