//! # binance-client
//!
//! Async client for the Binance spot exchange: REST resources for account,
//! orders and market data, and a streaming session manager that multiplexes
//! live subscriptions over one persistent WebSocket connection.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use binance_client::{Binance, BinanceConfig, StreamEvent, StreamHandler};
//!
//! struct Printer;
//!
//! #[async_trait::async_trait]
//! impl StreamHandler for Printer {
//!     async fn handle(&self, event: StreamEvent) -> binance_client::Result<()> {
//!         println!("{}: {}", event.stream, event.data);
//!         Ok(())
//!     }
//! }
//!
//! let binance = Binance::new(BinanceConfig::from_env())?;
//! binance.ws.start().await?;
//! binance.ws.trade("BTCUSDT", Arc::new(Printer)).await?;
//! binance.ws.wait_stop().await?;
//! ```

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod query;
pub mod rest;
pub mod ws;

pub use client::Client;
pub use config::BinanceConfig;
pub use endpoints::Endpoints;
pub use error::{BinanceError, Result};
pub use rest::{General, Market, OcoOrderRequest, OrderRequest, OrderSide, OrderType, Spot};
pub use ws::{
    AggTradeEvent, BookTickerEvent, DepthUpdateEvent, Kline, KlineEvent, MiniTickerEvent,
    StreamCallback, StreamEvent, StreamHandler, TradeEvent, Websocket, WsMethod,
};

/// Facade bundling the REST resources and the streaming session.
///
/// Resource handles share one HTTP client and configuration; clone the
/// resources freely, they are cheap reference-counted views.
pub struct Binance {
    client: Client,
    pub general: General,
    pub market: Market,
    pub spot: Spot,
    pub ws: Websocket,
}

impl Binance {
    pub fn new(config: BinanceConfig) -> Result<Self> {
        let client = Client::new(config)?;
        Ok(Self {
            general: General::new(client.clone()),
            market: Market::new(client.clone()),
            spot: Spot::new(client.clone()),
            ws: Websocket::new(client.clone()),
            client,
        })
    }

    /// Client with credentials read from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(BinanceConfig::from_env())
    }

    /// The underlying HTTP core, for custom requests.
    pub fn client(&self) -> &Client {
        &self.client
    }
}
