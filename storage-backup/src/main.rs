use anyhow::Result;
use clap::Parser;
use storage_backup::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load `.env` from the working directory only
    dotenvy::from_path(".env").ok();

    // Initialize tracing for the CLI.
    tracing_subscriber::fmt::init();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    tracing::info!("CLI arguments parsed, invoking run");
    let result = run(cli).await;
    match &result {
        Ok(_) => tracing::info!("CLI completed successfully"),
        Err(e) => tracing::error!(error = %e, "CLI exited with error"),
    }
    result
}
