//! Client configuration.

use std::env;
use std::time::Duration;

use crate::endpoints::Endpoints;

const REST_URL: &str = "https://api{cluster}.binance.{tld}/api/";
const STREAM_URL: &str = "wss://stream.binance.{tld}:443/stream";
const TESTNET_REST_URL: &str = "https://testnet.binance.vision/api/";
const TESTNET_STREAM_URL: &str = "wss://stream.testnet.binance.vision/stream";

/// Configuration for [`crate::Binance`].
///
/// `Default` gives an unauthenticated client against the production
/// endpoints; market data and public streams work without credentials.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// API key, sent as the `X-MBX-APIKEY` header when present
    pub api_key: Option<String>,
    /// API secret, used to sign account endpoints
    pub api_secret: Option<String>,
    /// Top-level domain of the deployment ("com", "us", ...)
    pub tld: String,
    /// Optional API cluster number (api1..api4)
    pub cluster: Option<u8>,
    /// Use the spot testnet endpoints
    pub testnet: bool,
    /// Full REST base URL override; takes precedence over tld/cluster
    pub rest_url: Option<String>,
    /// Full stream URL override; takes precedence over tld
    pub stream_url: Option<String>,
    /// How long to wait for a command reply
    pub command_timeout: Duration,
    /// Maximum command sends per one-second window
    pub commands_per_second: usize,
    /// Interval between protocol-level pings on the stream connection
    pub ping_interval: Duration,
    /// Interval between listen-key keep-alive requests
    pub keep_alive_interval: Duration,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            tld: "com".to_string(),
            cluster: None,
            testnet: false,
            rest_url: None,
            stream_url: None,
            command_timeout: Duration::from_secs(10),
            commands_per_second: 5,
            ping_interval: Duration::from_secs(180),
            keep_alive_interval: Duration::from_secs(1800),
        }
    }
}

impl BinanceConfig {
    /// Configuration with API credentials.
    pub fn with_credentials(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            api_secret: Some(api_secret.into()),
            ..Self::default()
        }
    }

    /// Read credentials from `BINANCE_API_KEY` / `BINANCE_API_SECRET`.
    ///
    /// Missing variables leave the corresponding field unset, so public
    /// endpoints keep working.
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("BINANCE_API_KEY").ok(),
            api_secret: env::var("BINANCE_API_SECRET").ok(),
            ..Self::default()
        }
    }

    /// Resolved REST base URL, with a trailing slash.
    pub fn rest_base(&self) -> String {
        if let Some(ref url) = self.rest_url {
            ensure_trailing_slash(url)
        } else if self.testnet {
            TESTNET_REST_URL.to_string()
        } else {
            let cluster = self.cluster.map(|c| c.to_string()).unwrap_or_default();
            REST_URL
                .replace("{cluster}", &cluster)
                .replace("{tld}", &self.tld)
        }
    }

    /// Resolved combined-stream WebSocket URL.
    pub fn stream_base(&self) -> String {
        if let Some(ref url) = self.stream_url {
            url.clone()
        } else if self.testnet {
            TESTNET_STREAM_URL.to_string()
        } else {
            STREAM_URL.replace("{tld}", &self.tld)
        }
    }

    /// Endpoint path table. Fixed for now; split out so forks can diverge.
    pub fn endpoints(&self) -> Endpoints {
        Endpoints::default()
    }
}

fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let config = BinanceConfig::default();
        assert_eq!(config.rest_base(), "https://api.binance.com/api/");
        assert_eq!(config.stream_base(), "wss://stream.binance.com:443/stream");
    }

    #[test]
    fn test_cluster_and_tld() {
        let config = BinanceConfig {
            tld: "us".to_string(),
            cluster: Some(3),
            ..BinanceConfig::default()
        };
        assert_eq!(config.rest_base(), "https://api3.binance.us/api/");
        assert_eq!(config.stream_base(), "wss://stream.binance.us:443/stream");
    }

    #[test]
    fn test_testnet_urls() {
        let config = BinanceConfig {
            testnet: true,
            ..BinanceConfig::default()
        };
        assert_eq!(config.rest_base(), "https://testnet.binance.vision/api/");
        assert_eq!(
            config.stream_base(),
            "wss://stream.testnet.binance.vision/stream"
        );
    }

    #[test]
    fn test_overrides_win() {
        let config = BinanceConfig {
            rest_url: Some("http://127.0.0.1:9001/api".to_string()),
            stream_url: Some("ws://127.0.0.1:9002/stream".to_string()),
            testnet: true,
            ..BinanceConfig::default()
        };
        assert_eq!(config.rest_base(), "http://127.0.0.1:9001/api/");
        assert_eq!(config.stream_base(), "ws://127.0.0.1:9002/stream");
    }
}
