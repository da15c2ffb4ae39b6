use crate::{
    conf::settings,
    pkg::{internal::retention, server::{listen, state::job_store}},
    prelude::Result,
};
use clap::{Parser, Subcommand};

mod migrate;

#[derive(Parser)]
#[command(about = "job listing catalog service")]
struct Cmd {
    #[command(subcommand)]
    command: Option<SubCommandType>,
}

#[derive(Subcommand)]
enum SubCommandType {
    /// Serve the HTTP API
    Listen,
    /// Apply database migrations
    Migrate,
    /// Delete jobs past the retention window and exit
    Purge,
}

pub async fn run() -> Result<()> {
    let args = Cmd::parse();
    match args.command {
        Some(SubCommandType::Listen) => {
            listen().await?;
        }
        Some(SubCommandType::Migrate) => {
            migrate::apply().await?;
        }
        Some(SubCommandType::Purge) => {
            let store = job_store()?;
            let removed = retention::purge_once(store.as_ref(), settings.retention_days).await?;
            tracing::info!("purge removed {} jobs", removed);
        }
        None => {
            tracing::error!("no subcommand passed");
        }
    }
    Ok(())
}
