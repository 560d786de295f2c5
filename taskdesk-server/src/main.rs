//! `TaskDesk` server: in-memory REST backend for tasks.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:5000
//! cargo run --bin taskdesk-server
//!
//! # Run on a custom address with a required token
//! cargo run --bin taskdesk-server -- --bind 127.0.0.1:8080 --token s3cret
//!
//! # Or via environment variables
//! TASKDESK_SERVER_ADDR=127.0.0.1:8080 cargo run --bin taskdesk-server
//! ```

use std::sync::Arc;

use clap::Parser;
use taskdesk_server::config::{ServerCliArgs, ServerConfig};
use taskdesk_server::routes::{self, AppState};

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        addr = %config.bind_addr,
        auth = config.token.is_some(),
        "starting taskdesk server"
    );

    let state = Arc::new(AppState::new().with_token(config.token));

    match routes::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "task server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "task server failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start task server");
            std::process::exit(1);
        }
    }
}
