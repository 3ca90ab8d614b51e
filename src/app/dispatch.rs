use crate::cli::Commands;
use anyhow::Result;
use chatgate::Config;
use chatgate::runtime::{load_access, start_bot};
use std::sync::Arc;

pub async fn dispatch(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Run => start_bot(Arc::new(config)).await,
        Commands::Check => check(&config).await,
    }
}

async fn check(config: &Config) -> Result<()> {
    let (_, access) = load_access(config).await?;
    println!("{}", config.redacted_summary());
    println!(
        "access: {} admin(s), {} allowed user(s){}",
        access.admins().len(),
        access.allowed().len(),
        if access.allowed().is_empty() {
            " (open access)"
        } else {
            ""
        }
    );
    println!("configuration OK");
    Ok(())
}
