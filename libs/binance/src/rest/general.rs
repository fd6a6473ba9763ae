use reqwest::Method;
use serde_json::Value;

use crate::client::Client;
use crate::error::{BinanceError, Result};
use crate::query::Query;

/// General endpoints: connectivity, server time, exchange metadata.
#[derive(Debug, Clone)]
pub struct General {
    client: Client,
}

impl General {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Test connectivity to the REST API.
    pub async fn ping(&self) -> Result<()> {
        self.client
            .request(Method::GET, self.client.endpoints().ping, false, Query::new())
            .await?;
        Ok(())
    }

    /// Server time in milliseconds since epoch.
    pub async fn server_time(&self) -> Result<i64> {
        let reply = self
            .client
            .request(
                Method::GET,
                self.client.endpoints().server_time,
                false,
                Query::new(),
            )
            .await?;
        reply
            .get("serverTime")
            .and_then(Value::as_i64)
            .ok_or_else(|| BinanceError::UnexpectedReply("missing serverTime".to_string()))
    }

    /// Exchange trading rules and symbol metadata.
    pub async fn exchange_info(
        &self,
        symbols: Option<&[&str]>,
        permissions: Option<&[&str]>,
    ) -> Result<Value> {
        let query = Query::new()
            .push_list("symbols", symbols)
            .push_list("permissions", permissions);
        self.client
            .request(
                Method::GET,
                self.client.endpoints().exchange_info,
                false,
                query,
            )
            .await
    }
}
