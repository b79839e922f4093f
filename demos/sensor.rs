//! Simulated temperature sensor
//!
//! Run with (or put AUTH_TOKEN in a .env file): AUTH_TOKEN=secret cargo run --example sensor [SERVER_ADDR]
//!
//! Pushes a random-walk temperature starting at 20.0 once per second. A
//! failed push is logged and the next tick reconnects.

use std::time::Duration;

use telemetry_hub::client::{ClientConfig, ReadingPublisher};
use telemetry_hub::sensor::TemperatureGenerator;
use telemetry_hub::Reading;

const INITIAL_TEMPERATURE: f64 = 20.0;
const PUSH_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Same variables may come from a local .env file
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sensor=info".parse()?),
        )
        .init();

    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    let mut config = ClientConfig::from_env();
    if let Some(addr) = std::env::args().nth(1) {
        config.server_addr = addr;
    }

    let mut publisher = ReadingPublisher::new(config);
    let mut generator = TemperatureGenerator::new(INITIAL_TEMPERATURE);
    let mut ticker = tokio::time::interval(PUSH_INTERVAL);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {}
        }

        let reading = Reading::now(generator.next_value());
        match publisher.push(reading).await {
            Ok(()) => tracing::info!(value = reading.value, "Pushed"),
            Err(e) => tracing::warn!(error = %e, "Push failed"),
        }
    }

    publisher.disconnect();
    Ok(())
}
