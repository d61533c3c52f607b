#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use clap::Parser;
use fleetmetrics::cli::{Cli, render, run};
use fleetmetrics::config::{self, load_configuration};
use tracing::Level;
use tracing::event;

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let cli = Cli::parse();

    load_configuration().context("Failed to load configuration")?;
    let config = config::get().context("Failed to get configuration")?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .init();

    match run(&cli.command, &config).await {
        Ok(output) => {
            println!("{}", render(&output, &config)?);
            Ok(())
        }
        Err(err) => {
            event!(Level::ERROR, "Command failed: {:#}", err);
            Err(err)
        }
    }
}
