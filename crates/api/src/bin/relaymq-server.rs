//! RelayMQ server entry point.
//!
//! Loads configuration, initializes tracing, and serves the broker's HTTP
//! and WebSocket surfaces.

use anyhow::Result;
use clap::{Parser, Subcommand};
use relaymq_common::SystemConfig;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "relaymq-server")]
#[command(version)]
#[command(about = "In-memory pub/sub broker with a WebSocket session protocol")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "relaymq.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the broker server
    Server {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },
    /// Validate configuration and exit
    ValidateConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = cli.log_level.as_deref().unwrap_or("info");
    relaymq_common::telemetry::init_tracing(log_level)?;

    let config = SystemConfig::load_or_default(&cli.config)?;
    if !std::path::Path::new(&cli.config).exists() {
        warn!(path = %cli.config, "config file not found, using defaults");
    }

    match cli.command {
        Some(Commands::ValidateConfig) => {
            println!("configuration is valid");
            println!("  bind: {}:{}", config.server.host, config.server.port);
            println!("  history capacity: {}", config.broker.history_capacity);
            println!("  dispatch queue depth: {}", config.broker.dispatch_queue_depth);
            Ok(())
        }
        Some(Commands::Server { host, port }) => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        None => serve(config).await,
    }
}

async fn serve(config: SystemConfig) -> Result<()> {
    info!(
        host = %config.server.host,
        port = config.server.port,
        "starting relaymq server"
    );
    relaymq_api::RelayServer::new(config).run().await
}
