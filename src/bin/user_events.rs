//! Private account event stream.
//!
//! Usage:
//!   BINANCE_API_KEY=... BINANCE_API_SECRET=... cargo run --bin user_events
//!
//! Obtains a listen key, keeps it alive in the background, and prints
//! every account event until Ctrl+C.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use binance_client::{Binance, BinanceConfig, StreamEvent, StreamHandler};
use binance_stream_bot::bin_common::load_credentials_from_env;
use tracing::{info, warn};

struct EventPrinter;

#[async_trait]
impl StreamHandler for EventPrinter {
    async fn handle(&self, event: StreamEvent) -> binance_client::Result<()> {
        let event_type = event
            .data
            .get("e")
            .and_then(|e| e.as_str())
            .unwrap_or("unknown");
        info!("{}: {}", event_type, event.data);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let Some(credentials) = load_credentials_from_env() else {
        bail!("BINANCE_API_KEY and BINANCE_API_SECRET must be set");
    };

    let config = BinanceConfig::with_credentials(credentials.api_key, credentials.api_secret);
    let binance = Binance::new(config)?;

    binance.ws.start().await?;
    let listen_key = binance.ws.user_data(Arc::new(EventPrinter)).await?;
    info!("listening for account events (listen key {}...)", &listen_key[..listen_key.len().min(8)]);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            binance.ws.close_listen_key(&listen_key).await.ok();
            binance.ws.stop().await?;
            binance.ws.wait_stop().await?;
        }
        result = binance.ws.wait_stop() => {
            if let Err(err) = result {
                warn!("stream session ended: {}", err);
            }
        }
    }

    Ok(())
}
