use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use firstp::cli::{inspect, Cli, Command, Workflow};
use firstp::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Inspect needs no API key, only a file.
    if let Some(Command::Inspect { file }) = &cli.command {
        init_default_logging();
        return Ok(inspect(file)?);
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.generation.model,
        "firstp starting..."
    );

    let mut workflow = match Workflow::new(&config) {
        Ok(w) => w,
        Err(e) => {
            error!(error = %e, "Failed to initialize workflow");
            return Err(e.into());
        }
    };

    if let Some(Command::Run { file: Some(path) }) = &cli.command {
        if let Err(e) = workflow.load_snapshot(path) {
            error!(error = %e, path = %path.display(), "Failed to load snapshot");
            return Err(e.into());
        }
        info!(path = %path.display(), "Resumed analysis from snapshot");
    }

    if let Err(e) = workflow.run().await {
        error!(error = %e, "Workflow error");
        return Err(e.into());
    }

    info!("firstp shutdown complete");
    Ok(())
}

/// Initialize tracing/logging from configuration
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        firstp::config::LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        firstp::config::LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Minimal logging when no configuration is loaded
fn init_default_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
