mod config;
mod error;
mod gateway;
mod rpc;
mod server;
mod service;
mod store;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use config::Config;
use gateway::Gateway;
use rpc::CacheClient;
use server::Server;
use store::Store;

/// In-memory key-value cache with a gRPC service and an HTTP gateway
#[derive(Debug, Parser)]
#[command(name = "kvcache", version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the gRPC cache service
    Cache {
        /// Listening address, overrides `cache_addr`
        #[arg(long)]
        listen: Option<String>,
    },
    /// Run the HTTP gateway
    Gateway {
        /// Listening address, overrides `gateway_addr`
        #[arg(long)]
        listen: Option<String>,
        /// Cache service address, overrides `cache_target` and GRPC_TARGET
        #[arg(long)]
        target: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.level)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Cache { listen } => {
            if let Some(listen) = listen {
                config.cache_addr = listen;
            }
            info!("Starting kvcache cache service");

            // One store per process, handed to the service explicitly
            let store = Arc::new(Store::new());
            let server = Server::bind(&config.cache_addr, store).await?;
            info!("Cache service ready on {}", server.local_addr());
            server.run(shutdown_signal()).await?;
        }
        Command::Gateway { listen, target } => {
            if let Some(listen) = listen {
                config.gateway_addr = listen;
            }
            if let Some(target) = target {
                config.cache_target = target;
            }
            info!("Starting kvcache gateway");

            let target = config.cache_uri();
            info!("Cache service target: {}", target);
            let client = CacheClient::connect_lazy(&target)?;
            let gateway = Gateway::bind(&config.gateway_addr, client).await?;
            info!("Gateway ready on {}", gateway.local_addr());
            gateway.run(shutdown_signal()).await?;
        }
    }

    Ok(())
}

/// Resolves on Ctrl-C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
