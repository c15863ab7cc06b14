mod commands;
mod config;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "calmirror")]
#[command(about = "Mirror events from source calendars into one destination calendar")]
struct Cli {
    /// Path to the configuration file
    /// (defaults to ~/.config/calmirror/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one mirror pass against the destination calendar
    Sync,
    /// Show what a pass would change, without touching the destination
    Status,
    /// List the calendars the server reports
    Calendars,
    /// Delete every event in the destination calendar
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Sync => commands::sync::run(&config).await,
        Commands::Status => commands::status::run(&config).await,
        Commands::Calendars => commands::calendars::run(&config).await,
        Commands::Clear { yes } => commands::clear::run(&config, yes).await,
    }
}
