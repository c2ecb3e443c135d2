mod cli;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use json_to_hugo::prelude::*;
use json_to_hugo::{SETTINGS_FILE, VERSION};

const RULE: &str = "-------------------------------------";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("{}", VERSION);
            Ok(())
        }
        None => run().await,
    }
}

async fn run() -> Result<()> {
    // .env is optional; variables may already be in the environment
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("json_to_hugo=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    info!("ServerURL: {}", config.base_url);

    let settings = Settings::load(SETTINGS_FILE)?;

    info!("\n{RULE}\n   Pulling Data from JSON Source...\n{RULE}\n");
    let report = Syncer::new(&config).sync_all(&settings.tables).await?;
    info!(
        "{} tables, {} records written, {} failed",
        report.len(),
        report.records_written(),
        report.failed()
    );
    info!("\n{RULE}\n");
    Ok(())
}
