//! Binance Stream Bot - Main Library
//!
//! Thin presentation layer over the workspace's `binance-client` crate:
//! shared utilities for the demo binaries under `src/bin/`.

// Re-export the workspace library for convenience
pub use binance_client;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;

    pub use cli::{
        load_credentials_from_env, symbols_from_args, Credentials, API_KEY_ENV, API_SECRET_ENV,
    };
}
