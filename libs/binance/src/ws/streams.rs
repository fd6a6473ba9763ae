//! Stream-name formatters.
//!
//! Builds the exchange-defined stream identifiers; symbols are lowercased
//! to match the case convention the stream endpoint expects.

pub fn trade(symbol: &str) -> String {
    format!("{}@trade", symbol.to_lowercase())
}

pub fn aggregate_trade(symbol: &str) -> String {
    format!("{}@aggTrade", symbol.to_lowercase())
}

pub fn kline(symbol: &str, interval: &str) -> String {
    format!("{}@kline_{}", symbol.to_lowercase(), interval)
}

pub fn mini_ticker(symbol: &str) -> String {
    format!("{}@miniTicker", symbol.to_lowercase())
}

/// All-market mini tickers.
pub fn mini_tickers() -> String {
    "!miniTicker@arr".to_string()
}

pub fn ticker(symbol: &str) -> String {
    format!("{}@ticker", symbol.to_lowercase())
}

/// All-market 24hr tickers.
pub fn tickers() -> String {
    "!ticker@arr".to_string()
}

pub fn window_ticker(symbol: &str, window_size: &str) -> String {
    format!("{}@ticker_{}", symbol.to_lowercase(), window_size)
}

pub fn window_tickers(window_size: &str) -> String {
    format!("!ticker_{}@arr", window_size)
}

pub fn book_ticker(symbol: &str) -> String {
    format!("{}@bookTicker", symbol.to_lowercase())
}

pub fn depth(symbol: &str) -> String {
    format!("{}@depth", symbol.to_lowercase())
}

pub fn partial_depth(symbol: &str, levels: u8) -> String {
    format!("{}@depth{}", symbol.to_lowercase(), levels)
}
