//! Live reading monitor
//!
//! Run with (or put AUTH_TOKEN in a .env file): AUTH_TOKEN=secret cargo run --example monitor [SERVER_ADDR]
//!
//! Subscribes to the hub and prints every reading together with the display
//! range of the last 60 values.

use bytes::Bytes;

use telemetry_hub::client::{ClientConfig, ReadingSubscriber, ReadingWindow};

const WINDOW_POINTS: usize = 60;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Same variables may come from a local .env file
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("monitor=info".parse()?),
        )
        .init();

    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    let mut config = ClientConfig::from_env();
    if let Some(addr) = std::env::args().nth(1) {
        config.server_addr = addr;
    }

    let mut subscriber = ReadingSubscriber::subscribe(&config, Bytes::new()).await?;
    let mut window = ReadingWindow::new(WINDOW_POINTS);
    println!("Subscribed to {}", config.server_addr);

    loop {
        let reading = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = subscriber.next() => match next? {
                Some(reading) => reading,
                None => {
                    println!("Server closed the stream");
                    break;
                }
            },
        };

        window.push(reading);
        match window.value_bounds() {
            Some((lo, hi)) => println!(
                "{}  {:>7.2}  [{:.2} .. {:.2}]",
                reading.timestamp, reading.value, lo, hi
            ),
            None => println!("{}  {:>7.2}", reading.timestamp, reading.value),
        }
    }

    tracing::info!(received = subscriber.received(), "Monitor stopped");
    Ok(())
}
