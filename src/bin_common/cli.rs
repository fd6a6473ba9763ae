//! Environment and argument handling shared by the binaries.

use std::env;

pub const API_KEY_ENV: &str = "BINANCE_API_KEY";
pub const API_SECRET_ENV: &str = "BINANCE_API_SECRET";

/// API credentials loaded from the environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

/// Read credentials from `BINANCE_API_KEY` / `BINANCE_API_SECRET`.
///
/// Returns `None` unless both are set; public market streams work without
/// them.
pub fn load_credentials_from_env() -> Option<Credentials> {
    let api_key = env::var(API_KEY_ENV).ok()?;
    let api_secret = env::var(API_SECRET_ENV).ok()?;
    Some(Credentials {
        api_key,
        api_secret,
    })
}

/// Trading symbols from the command line, with a default watchlist.
pub fn symbols_from_args(args: impl Iterator<Item = String>) -> Vec<String> {
    let symbols: Vec<String> = args.map(|s| s.to_uppercase()).collect();
    if symbols.is_empty() {
        vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]
    } else {
        symbols
    }
}
