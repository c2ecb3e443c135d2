use clap::{Parser, Subcommand};

/// Convert JSON content to hugo format
#[derive(Parser)]
#[command(name = "json-to-hugo")]
#[command(about = "Convert json content to hugo format", long_about = None)]
pub struct Cli {
    /// Runs the full sync when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version
    #[command(visible_alias = "v")]
    Version,
}
