//! Telemetry hub server
//!
//! Run with (or put AUTH_TOKEN in a .env file): AUTH_TOKEN=secret cargo run --example hub_server
//!
//! Environment:
//!   AUTH_TOKEN       shared secret clients must present (required)
//!   SERVER_ADDRESS   bind address, default 0.0.0.0:50051
//!   QUEUE_CAPACITY   per-subscriber buffer, default 100
//!   MAX_CONNECTIONS  0 for unlimited (default)
//!
//! Pair it with the `sensor` and `monitor` examples:
//!
//! ```text
//!   sensor ──push──> hub_server ──stream──> monitor
//!                               ──stream──> monitor
//! ```

use std::sync::Arc;
use std::time::Duration;

use telemetry_hub::{ServerConfig, TelemetryServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Same variables may come from a local .env file
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("telemetry_hub=debug".parse()?)
                .add_directive("hub_server=info".parse()?),
        )
        .init();

    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    let config = ServerConfig::from_env()?;
    let server = Arc::new(TelemetryServer::new(config));

    // Periodic stats
    let reporter = {
        let server = Arc::clone(&server);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(30));
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let hub = server.hub().stats();
                tracing::info!(
                    subscribers = server.hub().registry().len(),
                    connections = server.stats().active_connections(),
                    published = hub.published,
                    rejected = hub.rejected,
                    dropped = hub.dropped,
                    "Hub stats"
                );
            }
        })
    };

    let result = server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
        })
        .await;

    reporter.abort();
    result?;
    Ok(())
}
