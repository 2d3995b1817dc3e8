//! Launch the configured number of move bots against a local Pong server.
//!
//! ```sh
//! cargo run
//!
//! # Point at another server or change the bot count:
//! PONG_BOT_URL=ws://10.0.0.5:8080/ws PONG_BOT_CONNECTIONS=8 cargo run
//!
//! # Log every sent move:
//! RUST_LOG=debug cargo run
//! ```

use pong_bot_client::config::DEFAULT_CONNECTIONS;
use pong_bot_client::{driver, DriverConfig};

/// Overrides the server URL.
const URL_VAR: &str = "PONG_BOT_URL";

/// Overrides the number of connections.
const CONNECTIONS_VAR: &str = "PONG_BOT_CONNECTIONS";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = config_from_env();
    tracing::info!(
        url = %config.url,
        connections = config.connections,
        "starting move bots"
    );

    tokio::select! {
        outcomes = driver::run(&config) => {
            let moves: u64 = outcomes.iter().map(|outcome| outcome.moves_sent).sum();
            tracing::info!(drivers = outcomes.len(), moves, "all drivers stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received, dropping connections");
        }
    }
}

fn config_from_env() -> DriverConfig {
    let mut config = match std::env::var(URL_VAR) {
        Ok(url) => DriverConfig::new(url),
        Err(_) => DriverConfig::default(),
    };

    if let Ok(raw) = std::env::var(CONNECTIONS_VAR) {
        match raw.trim().parse::<usize>() {
            Ok(connections) => config = config.with_connections(connections),
            Err(e) => tracing::warn!(
                value = %raw,
                error = %e,
                default = DEFAULT_CONNECTIONS,
                "ignoring invalid {CONNECTIONS_VAR}"
            ),
        }
    }

    config
}
