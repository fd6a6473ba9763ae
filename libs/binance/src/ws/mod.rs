//! Streaming session manager.
//!
//! Owns one persistent connection to the combined-stream endpoint and
//! multiplexes everything over it: subscribe/unsubscribe commands with
//! correlation IDs, market and account event fan-out to registered
//! callbacks, an outbound command rate limit, and the listen-key lifecycle
//! for private account streams.
//!
//! The connection does not reconnect on its own; when the receive loop
//! exits, all per-connection state is cleared and the caller starts a
//! fresh session (and re-subscribes) with [`Websocket::start`].

mod events;
mod limiter;
mod pending;
mod registry;
mod session;
pub mod streams;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

pub use events::{
    AggTradeEvent, BookTickerEvent, CommandError, DepthUpdateEvent, Kline, KlineEvent,
    MiniTickerEvent, StreamEvent, TradeEvent, WsCommand, WsMethod,
};
pub use session::Websocket;

/// Capability interface for stream callbacks.
///
/// Each inbound event frame is delivered to every handler registered for
/// its stream, each invocation running as its own task: a slow or failing
/// handler cannot stall the receive loop or delivery to other handlers.
///
/// Handler errors are logged and the first one is reported to whoever is
/// waiting in [`Websocket::wait_stop`]; they do not close the connection.
#[async_trait]
pub trait StreamHandler: Send + Sync {
    async fn handle(&self, event: StreamEvent) -> Result<()>;
}

/// Shared handle to a registered callback; identity is pointer identity.
pub type StreamCallback = Arc<dyn StreamHandler>;
