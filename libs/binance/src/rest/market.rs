use reqwest::Method;
use serde_json::Value;

use crate::client::Client;
use crate::error::Result;
use crate::query::Query;

/// Market data endpoints.
///
/// All of these are unsigned; responses are returned as raw JSON since the
/// exchange's shapes vary per endpoint and most callers feed them straight
/// into their own models.
#[derive(Debug, Clone)]
pub struct Market {
    client: Client,
}

impl Market {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn order_book(&self, symbol: &str, limit: Option<u32>) -> Result<Value> {
        let query = Query::new()
            .push("symbol", symbol)
            .push_num_opt("limit", limit);
        self.client
            .request(Method::GET, self.client.endpoints().order_book, false, query)
            .await
    }

    pub async fn recent_trades(&self, symbol: &str, limit: Option<u32>) -> Result<Value> {
        let query = Query::new()
            .push("symbol", symbol)
            .push_num_opt("limit", limit);
        self.client
            .request(
                Method::GET,
                self.client.endpoints().recent_trades,
                false,
                query,
            )
            .await
    }

    pub async fn old_trades(
        &self,
        symbol: &str,
        limit: Option<u32>,
        from_id: Option<u64>,
    ) -> Result<Value> {
        let query = Query::new()
            .push("symbol", symbol)
            .push_num_opt("limit", limit)
            .push_num_opt("fromId", from_id);
        self.client
            .request(Method::GET, self.client.endpoints().old_trades, false, query)
            .await
    }

    pub async fn aggregate_trades(
        &self,
        symbol: &str,
        from_id: Option<u64>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Value> {
        let query = Query::new()
            .push("symbol", symbol)
            .push_num_opt("fromId", from_id)
            .push_num_opt("startTime", start_time)
            .push_num_opt("endTime", end_time)
            .push_num_opt("limit", limit);
        self.client
            .request(
                Method::GET,
                self.client.endpoints().aggregate_trades,
                false,
                query,
            )
            .await
    }

    pub async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Value> {
        let query = Query::new()
            .push("symbol", symbol)
            .push("interval", interval)
            .push_num_opt("startTime", start_time)
            .push_num_opt("endTime", end_time)
            .push_num_opt("limit", limit);
        self.client
            .request(Method::GET, self.client.endpoints().klines, false, query)
            .await
    }

    /// Klines optimized for chart presentation.
    pub async fn ui_klines(
        &self,
        symbol: &str,
        interval: &str,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Value> {
        let query = Query::new()
            .push("symbol", symbol)
            .push("interval", interval)
            .push_num_opt("startTime", start_time)
            .push_num_opt("endTime", end_time)
            .push_num_opt("limit", limit);
        self.client
            .request(Method::GET, self.client.endpoints().ui_klines, false, query)
            .await
    }

    pub async fn average_price(&self, symbol: &str) -> Result<Value> {
        let query = Query::new().push("symbol", symbol);
        self.client
            .request(
                Method::GET,
                self.client.endpoints().average_price,
                false,
                query,
            )
            .await
    }

    pub async fn ticker_24hr(
        &self,
        symbols: Option<&[&str]>,
        ticker_type: Option<&str>,
    ) -> Result<Value> {
        let query = Query::new()
            .push_list("symbols", symbols)
            .push_opt("type", ticker_type);
        self.client
            .request(Method::GET, self.client.endpoints().ticker_24hr, false, query)
            .await
    }

    pub async fn price_ticker(&self, symbols: Option<&[&str]>) -> Result<Value> {
        let query = Query::new().push_list("symbols", symbols);
        self.client
            .request(
                Method::GET,
                self.client.endpoints().price_ticker,
                false,
                query,
            )
            .await
    }

    pub async fn order_book_ticker(&self, symbols: Option<&[&str]>) -> Result<Value> {
        let query = Query::new().push_list("symbols", symbols);
        self.client
            .request(
                Method::GET,
                self.client.endpoints().order_book_ticker,
                false,
                query,
            )
            .await
    }

    pub async fn rolling_window_ticker(
        &self,
        symbols: &[&str],
        window_size: Option<&str>,
        ticker_type: Option<&str>,
    ) -> Result<Value> {
        let query = Query::new()
            .push_list("symbols", Some(symbols))
            .push_opt("windowSize", window_size)
            .push_opt("type", ticker_type);
        self.client
            .request(
                Method::GET,
                self.client.endpoints().rolling_window_ticker,
                false,
                query,
            )
            .await
    }
}
