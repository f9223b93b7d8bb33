//! Launchpad API server
//!
//! Serves trading metrics for bonding curve pools and runs the vanity mint
//! address pool.

use anyhow::Result;
use clap::Parser;
use launchpad_api::{api, LaunchpadConfig, ServiceContainer};
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const BENCHMARK_DURATION: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "launchpad-api")]
#[command(about = "Launchpad trading metrics and vanity address service")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "launchpad.toml")]
    config: String,

    /// Override log level
    #[arg(long)]
    log_level: Option<String>,

    /// Dry run mode (validate config and exit)
    #[arg(long)]
    dry_run: bool,

    /// Measure single-thread keypair generation throughput and exit
    #[arg(long)]
    benchmark: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_found = std::path::Path::new(&cli.config).exists();
    let mut config = if config_found {
        LaunchpadConfig::from_file(&cli.config)?
    } else {
        LaunchpadConfig::default()
    };

    // Override log level if provided
    if let Some(log_level) = cli.log_level {
        config.monitoring.log_level = log_level;
    }

    init_logging(&config)?;
    if !config_found {
        warn!("Config file not found, using defaults: {}", cli.config);
    }

    if cli.benchmark {
        info!("Benchmarking keypair generation for {:?}", BENCHMARK_DURATION);
        let rate = tokio::task::spawn_blocking(|| vanity_miner::benchmark(BENCHMARK_DURATION)).await??;
        info!("Keypair generation rate: {} attempts/s", rate);
        return Ok(());
    }

    info!("Starting Launchpad API");
    info!("RPC endpoint: {}", config.rpc.endpoint);
    info!("Curve program: {}", config.rpc.curve_program_id);
    info!("Storage backend: {:?}", config.storage.backend);

    config.validate_all()?;
    info!("Configuration validated successfully");

    if cli.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        return Ok(());
    }

    let container = ServiceContainer::new(config).await?;
    container.health_check().await?;

    info!("Starting API server on {}", container.config.api.bind_address);
    let api_server = api::start_server(container.api_state(), &container.config.api).await?;

    info!("Launchpad API started successfully. Press Ctrl+C to shutdown.");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = api_server => {
            if let Err(e) = result {
                error!("API server task error: {}", e);
            }
        }
    }

    container.shutdown().await;
    info!("Shutting down Launchpad API");
    Ok(())
}

fn init_logging(config: &LaunchpadConfig) -> Result<()> {
    let log_level = config
        .monitoring
        .log_level
        .parse()
        .unwrap_or(tracing::Level::INFO);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "launchpad_api={},vanity_miner={},tower_http=info",
            log_level, log_level
        )
        .into()
    });

    if config.monitoring.structured_logging {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()?;
    }

    Ok(())
}
