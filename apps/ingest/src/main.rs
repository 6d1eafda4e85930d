mod analyze;
mod cli;
mod config;
mod errors;
mod extract;
mod fs_ops;
mod llm_client;
mod models;
mod pipeline;
mod render;
mod report;
mod state;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first; CLI flags win over the environment
    let mut config = Config::from_env()?;
    cli.apply(&mut config);

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::new(config.log_filter()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-ingest v{}", env!("CARGO_PKG_VERSION"));
    if config.has_credential() {
        info!("LLM analysis enabled (model: {})", config.openai_model);
    } else {
        info!("OPENAI_API_KEY not set; analysis will use the simulated profile");
    }

    // Any error here exits with status 1
    cli::handle_command(cli, config).await
}
