//! Integration test: binary environment utilities.

use binance_stream_bot::bin_common::{
    load_credentials_from_env, symbols_from_args, API_KEY_ENV, API_SECRET_ENV,
};
use std::env;

#[test]
fn test_credentials_require_both_variables() {
    // One test body: these share process-global environment state.
    env::remove_var(API_KEY_ENV);
    env::remove_var(API_SECRET_ENV);
    assert!(load_credentials_from_env().is_none());

    env::set_var(API_KEY_ENV, "key");
    assert!(load_credentials_from_env().is_none());

    env::set_var(API_SECRET_ENV, "secret");
    let credentials = load_credentials_from_env().unwrap();
    assert_eq!(credentials.api_key, "key");
    assert_eq!(credentials.api_secret, "secret");

    env::remove_var(API_KEY_ENV);
    env::remove_var(API_SECRET_ENV);
}

#[test]
fn test_symbols_default_watchlist() {
    let symbols = symbols_from_args(std::iter::empty());
    assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT"]);
}

#[test]
fn test_symbols_are_uppercased() {
    let args = ["btcusdt".to_string(), "SolUsdt".to_string()];
    let symbols = symbols_from_args(args.into_iter());
    assert_eq!(symbols, vec!["BTCUSDT", "SOLUSDT"]);
}
