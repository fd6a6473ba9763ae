//! Live trade tape from the combined stream endpoint.
//!
//! Usage:
//!   cargo run --bin stream_trades [SYMBOL ...]
//!
//! Defaults to BTCUSDT and ETHUSDT. Public streams, no credentials needed.
//! Press Ctrl+C to stop.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use binance_client::{Binance, BinanceConfig, StreamEvent, StreamHandler, TradeEvent};
use binance_stream_bot::bin_common::symbols_from_args;
use tracing::{info, warn};

struct TradePrinter;

#[async_trait]
impl StreamHandler for TradePrinter {
    async fn handle(&self, event: StreamEvent) -> binance_client::Result<()> {
        let trade: TradeEvent = event.decode()?;
        let side = if trade.is_buyer_maker { "SELL" } else { "BUY" };
        info!(
            "{:>10} {:>4} {:>14} x {}",
            trade.symbol, side, trade.price, trade.quantity
        );
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

    let symbols = symbols_from_args(std::env::args().skip(1));
    let binance = Binance::new(BinanceConfig::default())?;

    binance.ws.start().await?;
    info!("connected, subscribing to {} trade streams", symbols.len());

    for symbol in &symbols {
        binance.ws.trade(symbol, Arc::new(TradePrinter)).await?;
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
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
