//! Wire types for the stream connection.
//!
//! Outbound commands and the combined-stream event envelope, plus typed
//! payloads for the common market events. Account events vary with the
//! exchange's user-data schema and stay as raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Command verbs accepted over the stream connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WsMethod {
    Subscribe,
    Unsubscribe,
    ListSubscriptions,
}

/// Outbound command frame.
///
/// Field order is load-bearing: the wire format is
/// `{"method":...,"id":...,"params":[...]}` with `params` omitted when
/// absent.
#[derive(Debug, Clone, Serialize)]
pub struct WsCommand {
    pub method: WsMethod,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<String>>,
}

impl WsCommand {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Error object carried by a server error frame.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandError {
    pub code: i64,
    pub msg: String,
}

/// One event from the combined stream endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEvent {
    /// Stream the event was published on (e.g. `"btcusdt@trade"`)
    pub stream: String,
    /// Raw event payload
    pub data: Value,
}

impl StreamEvent {
    /// Decode the payload into a typed event.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

/// Raw trade event.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    /// Event time (ms since epoch)
    #[serde(rename = "E")]
    pub event_time: u64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "t")]
    pub trade_id: u64,
    /// Price as string; parse with [`TradeEvent::price_f64`]
    #[serde(rename = "p")]
    pub price: String,
    #[serde(rename = "q")]
    pub quantity: String,
    #[serde(rename = "T")]
    pub trade_time: u64,
    /// True when the buyer is the market maker (sell aggressor)
    #[serde(rename = "m")]
    pub is_buyer_maker: bool,
}

impl TradeEvent {
    pub fn price_f64(&self) -> Option<f64> {
        self.price.parse().ok()
    }

    pub fn quantity_f64(&self) -> Option<f64> {
        self.quantity.parse().ok()
    }
}

/// Aggregated trade event.
#[derive(Debug, Clone, Deserialize)]
pub struct AggTradeEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: u64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "a")]
    pub agg_trade_id: u64,
    #[serde(rename = "p")]
    pub price: String,
    #[serde(rename = "q")]
    pub quantity: String,
    #[serde(rename = "f")]
    pub first_trade_id: u64,
    #[serde(rename = "l")]
    pub last_trade_id: u64,
    #[serde(rename = "T")]
    pub trade_time: u64,
    #[serde(rename = "m")]
    pub is_buyer_maker: bool,
}

/// Kline/candlestick event; the candle itself is nested under `k`.
#[derive(Debug, Clone, Deserialize)]
pub struct KlineEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: u64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "k")]
    pub kline: Kline,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Kline {
    #[serde(rename = "t")]
    pub open_time: i64,
    #[serde(rename = "T")]
    pub close_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "i")]
    pub interval: String,
    #[serde(rename = "f")]
    pub first_trade_id: i64,
    #[serde(rename = "L")]
    pub last_trade_id: i64,
    #[serde(rename = "o")]
    pub open: String,
    #[serde(rename = "c")]
    pub close: String,
    #[serde(rename = "h")]
    pub high: String,
    #[serde(rename = "l")]
    pub low: String,
    #[serde(rename = "v")]
    pub volume: String,
    #[serde(rename = "n")]
    pub trade_count: u64,
    /// Whether this candle is closed
    #[serde(rename = "x")]
    pub is_closed: bool,
    #[serde(rename = "q")]
    pub quote_volume: String,
    #[serde(rename = "V")]
    pub taker_buy_volume: String,
    #[serde(rename = "Q")]
    pub taker_buy_quote_volume: String,
}

/// Mini ticker event.
#[derive(Debug, Clone, Deserialize)]
pub struct MiniTickerEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: u64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "c")]
    pub close: String,
    #[serde(rename = "o")]
    pub open: String,
    #[serde(rename = "h")]
    pub high: String,
    #[serde(rename = "l")]
    pub low: String,
    #[serde(rename = "v")]
    pub volume: String,
    #[serde(rename = "q")]
    pub quote_volume: String,
}

/// Best bid/ask update. This payload has no event-type tag.
#[derive(Debug, Clone, Deserialize)]
pub struct BookTickerEvent {
    #[serde(rename = "u")]
    pub update_id: u64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "b")]
    pub bid_price: String,
    #[serde(rename = "B")]
    pub bid_quantity: String,
    #[serde(rename = "a")]
    pub ask_price: String,
    #[serde(rename = "A")]
    pub ask_quantity: String,
}

/// Incremental order-book update.
#[derive(Debug, Clone, Deserialize)]
pub struct DepthUpdateEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: u64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "U")]
    pub first_update_id: u64,
    #[serde(rename = "u")]
    pub last_update_id: u64,
    /// Price level / quantity pairs, quantity `"0"` deletes the level
    #[serde(rename = "b")]
    pub bids: Vec<[String; 2]>,
    #[serde(rename = "a")]
    pub asks: Vec<[String; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let command = WsCommand {
            method: WsMethod::Subscribe,
            id: 1,
            params: Some(vec!["btcusdt@trade".to_string()]),
        };
        assert_eq!(
            command.to_json().unwrap(),
            r#"{"method":"SUBSCRIBE","id":1,"params":["btcusdt@trade"]}"#
        );
    }

    #[test]
    fn test_command_without_params_omits_key() {
        let command = WsCommand {
            method: WsMethod::ListSubscriptions,
            id: 7,
            params: None,
        };
        assert_eq!(
            command.to_json().unwrap(),
            r#"{"method":"LIST_SUBSCRIPTIONS","id":7}"#
        );
    }

    #[test]
    fn test_unsubscribe_rendering() {
        let command = WsCommand {
            method: WsMethod::Unsubscribe,
            id: 3,
            params: Some(vec!["btcusdt@trade".to_string(), "ethusdt@trade".to_string()]),
        };
        assert_eq!(
            command.to_json().unwrap(),
            r#"{"method":"UNSUBSCRIBE","id":3,"params":["btcusdt@trade","ethusdt@trade"]}"#
        );
    }

    #[test]
    fn test_decode_trade_event() {
        let json = r#"{
            "stream": "btcusdt@trade",
            "data": {
                "e": "trade",
                "E": 1766482935996,
                "s": "BTCUSDT",
                "t": 5697810014,
                "p": "87398.39000000",
                "q": "0.00103000",
                "T": 1766482935995,
                "m": false,
                "M": true
            }
        }"#;

        let event: StreamEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.stream, "btcusdt@trade");

        let trade: TradeEvent = event.decode().unwrap();
        assert_eq!(trade.event_type, "trade");
        assert_eq!(trade.symbol, "BTCUSDT");
        assert_eq!(trade.trade_id, 5697810014);
        assert!((trade.price_f64().unwrap() - 87398.39).abs() < 1e-9);
        assert!((trade.quantity_f64().unwrap() - 0.00103).abs() < 1e-9);
        assert!(!trade.is_buyer_maker);
    }

    #[test]
    fn test_decode_kline_event() {
        let json = r#"{
            "e": "kline",
            "E": 1700000000123,
            "s": "ETHUSDT",
            "k": {
                "t": 1700000000000,
                "T": 1700000059999,
                "s": "ETHUSDT",
                "i": "1m",
                "f": 100,
                "L": 200,
                "o": "2000.10000000",
                "c": "2001.50000000",
                "h": "2002.00000000",
                "l": "1999.90000000",
                "v": "15.30000000",
                "n": 101,
                "x": false,
                "q": "30620.00000000",
                "V": "7.10000000",
                "Q": "14210.00000000",
                "B": "0"
            }
        }"#;

        let event: KlineEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kline.interval, "1m");
        assert_eq!(event.kline.trade_count, 101);
        assert!(!event.kline.is_closed);
    }

    #[test]
    fn test_decode_depth_update() {
        let json = r#"{
            "e": "depthUpdate",
            "E": 1700000000500,
            "s": "BTCUSDT",
            "U": 157,
            "u": 160,
            "b": [["87000.00000000", "0.43100000"]],
            "a": [["87001.00000000", "0.00000000"]]
        }"#;

        let update: DepthUpdateEvent = serde_json::from_str(json).unwrap();
        assert_eq!(update.first_update_id, 157);
        assert_eq!(update.bids[0][0], "87000.00000000");
        assert_eq!(update.asks[0][1], "0.00000000");
    }

    #[test]
    fn test_decode_book_ticker() {
        let json = r#"{
            "u": 400900217,
            "s": "BNBUSDT",
            "b": "25.35190000",
            "B": "31.21000000",
            "a": "25.36520000",
            "A": "40.66000000"
        }"#;

        let ticker: BookTickerEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ticker.update_id, 400900217);
        assert_eq!(ticker.symbol, "BNBUSDT");
    }
}
