//! HTTP core: the generic request executor shared by every REST resource.

use std::sync::Arc;

use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Method, Url};
use serde_json::Value;
use sha2::Sha256;
use tracing::debug;

use crate::config::BinanceConfig;
use crate::endpoints::Endpoints;
use crate::error::{BinanceError, Result};
use crate::query::Query;

const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Shared HTTP client.
///
/// Cheap to clone; the underlying connection pool and configuration are
/// reference-counted.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: Arc<BinanceConfig>,
    endpoints: Arc<Endpoints>,
}

impl Client {
    pub fn new(config: BinanceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("binance-client"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(ref key) = config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| BinanceError::Credentials("api key is not a valid header value"))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let http = reqwest::Client::builder().default_headers(headers).build()?;
        let endpoints = Arc::new(config.endpoints());

        Ok(Self {
            http,
            config: Arc::new(config),
            endpoints,
        })
    }

    pub fn config(&self) -> &BinanceConfig {
        &self.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Execute one REST call and decode the JSON body.
    ///
    /// `signed` appends `timestamp` and an HMAC-SHA256 `signature` over the
    /// exact query string that goes on the wire.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        signed: bool,
        query: Query,
    ) -> Result<Value> {
        let mut url = self.build_url(endpoint, &query)?;

        if signed {
            let timestamp = Utc::now().timestamp_millis();
            url.query_pairs_mut()
                .append_pair("timestamp", &timestamp.to_string());
            let payload = url.query().unwrap_or_default().to_string();
            let signature = self.sign(&payload)?;
            url.query_pairs_mut().append_pair("signature", &signature);
        }

        debug!("{} {}", method, url);

        let response = self.http.request(method, url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BinanceError::Api { status, body });
        }

        Ok(response.json().await?)
    }

    fn build_url(&self, endpoint: &str, query: &Query) -> Result<Url> {
        let base = self.config.rest_base();
        let mut url = Url::parse(&format!("{}{}", base, endpoint))
            .map_err(|e| BinanceError::Config(format!("invalid URL: {}", e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.pairs() {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// HMAC-SHA256 over the urlencoded query, hex-encoded.
    fn sign(&self, payload: &str) -> Result<String> {
        let secret = self
            .config
            .api_secret
            .as_deref()
            .ok_or(BinanceError::Credentials("api secret is required"))?;
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_secret(secret: &str) -> Client {
        let config = BinanceConfig {
            api_secret: Some(secret.to_string()),
            ..BinanceConfig::default()
        };
        Client::new(config).unwrap()
    }

    #[test]
    fn test_signature_matches_exchange_docs_vector() {
        // Reference vector from the exchange's signed-endpoint example.
        let client = client_with_secret(
            "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j",
        );
        let payload = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        let signature = client.sign(payload).unwrap();
        assert_eq!(
            signature,
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_sign_without_secret_fails() {
        let client = Client::new(BinanceConfig::default()).unwrap();
        assert!(matches!(
            client.sign("symbol=BTCUSDT"),
            Err(BinanceError::Credentials(_))
        ));
    }

    #[test]
    fn test_build_url_encodes_query() {
        let client = Client::new(BinanceConfig::default()).unwrap();
        let query = Query::new().push_list("symbols", Some(&["BTCUSDT", "ETHUSDT"]));
        let url = client.build_url("v3/ticker/price", &query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.binance.com/api/v3/ticker/price?symbols=%5B%22BTCUSDT%22%2C%22ETHUSDT%22%5D"
        );
    }

    #[test]
    fn test_build_url_without_query() {
        let client = Client::new(BinanceConfig::default()).unwrap();
        let url = client.build_url("v3/ping", &Query::new()).unwrap();
        assert_eq!(url.as_str(), "https://api.binance.com/api/v3/ping");
    }
}
