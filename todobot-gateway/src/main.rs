//! TodoBot gateway -- chat front door for the per-user task engine.
//!
//! A WebSocket server where each connection identifies itself as one
//! user and then sends chat lines; prefixed lines run task commands
//! against that user's list.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:9100
//! cargo run --bin todobot-gateway
//!
//! # Run on custom address with a custom snapshot file
//! cargo run --bin todobot-gateway -- --bind 127.0.0.1:8080 \
//!     --data-file ./todo_data.json
//!
//! # Or via environment variables
//! TODOBOT_ADDR=127.0.0.1:8080 cargo run --bin todobot-gateway
//! ```

use std::sync::Arc;

use clap::Parser;
use todobot_core::snapshot::FileStorage;
use todobot_core::store::TaskStore;
use todobot_gateway::config::{GatewayCliArgs, GatewayConfig};
use todobot_gateway::server::{self, GatewayState};

#[tokio::main]
async fn main() {
    let cli = GatewayCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match GatewayConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(data_file = %config.data_file.display(), "loading task store");

    // A missing snapshot starts empty; a corrupt one must not be
    // half-trusted, so refuse to start.
    let store = match TaskStore::open(Box::new(FileStorage::new(&config.data_file))) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to load task store");
            std::process::exit(1);
        }
    };

    let state = Arc::new(GatewayState::new(store, config.prefix.clone()));

    match server::start_server(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, prefix = %config.prefix, "todobot gateway listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "gateway server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start gateway server");
            std::process::exit(1);
        }
    }
}
