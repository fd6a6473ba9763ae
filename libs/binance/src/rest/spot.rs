use reqwest::Method;
use serde_json::Value;

use crate::client::Client;
use crate::error::Result;
use crate::query::Query;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Limit,
    Market,
    StopLoss,
    StopLossLimit,
    TakeProfit,
    TakeProfitLimit,
    LimitMaker,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
            OrderType::StopLoss => "STOP_LOSS",
            OrderType::StopLossLimit => "STOP_LOSS_LIMIT",
            OrderType::TakeProfit => "TAKE_PROFIT",
            OrderType::TakeProfitLimit => "TAKE_PROFIT_LIMIT",
            OrderType::LimitMaker => "LIMIT_MAKER",
        }
    }
}

/// Optional parameters shared by the order-placement endpoints.
#[derive(Debug, Clone, Default)]
pub struct OrderRequest {
    pub time_in_force: Option<String>,
    pub quantity: Option<f64>,
    pub quote_order_qty: Option<f64>,
    pub price: Option<f64>,
    pub stop_price: Option<f64>,
    pub new_client_order_id: Option<String>,
    pub strategy_id: Option<u64>,
    pub strategy_type: Option<u64>,
    pub trailing_delta: Option<u64>,
    pub iceberg_qty: Option<f64>,
    pub order_resp_type: Option<String>,
}

impl OrderRequest {
    fn apply(&self, query: Query) -> Query {
        query
            .push_opt("timeInForce", self.time_in_force.clone())
            .push_num_opt("quantity", self.quantity)
            .push_num_opt("quoteOrderQty", self.quote_order_qty)
            .push_num_opt("price", self.price)
            .push_opt("newClientOrderId", self.new_client_order_id.clone())
            .push_num_opt("strategyId", self.strategy_id)
            .push_num_opt("strategyType", self.strategy_type)
            .push_num_opt("stopPrice", self.stop_price)
            .push_num_opt("trailingDelta", self.trailing_delta)
            .push_num_opt("icebergQty", self.iceberg_qty)
            .push_opt("newOrderRespType", self.order_resp_type.clone())
    }
}

/// Optional parameters for the one-cancels-the-other endpoint.
#[derive(Debug, Clone, Default)]
pub struct OcoOrderRequest {
    pub list_client_order_id: Option<String>,
    pub limit_client_order_id: Option<String>,
    pub limit_strategy_id: Option<u64>,
    pub limit_strategy_type: Option<u64>,
    pub limit_iceberg_qty: Option<f64>,
    pub trailing_delta: Option<u64>,
    pub stop_client_order_id: Option<String>,
    pub stop_strategy_id: Option<u64>,
    pub stop_strategy_type: Option<u64>,
    pub stop_limit_price: Option<f64>,
    pub stop_iceberg_qty: Option<f64>,
    pub stop_limit_time_in_force: Option<String>,
    pub new_order_resp_type: Option<String>,
}

/// Spot account and trading endpoints. All signed.
#[derive(Debug, Clone)]
pub struct Spot {
    client: Client,
}

impl Spot {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    fn order_query(
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        request: &OrderRequest,
    ) -> Query {
        let query = Query::new()
            .push("symbol", symbol)
            .push("side", side.as_str())
            .push("type", order_type.as_str());
        request.apply(query)
    }

    /// Validate an order without sending it to the matching engine.
    pub async fn create_test_order(
        &self,
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        request: &OrderRequest,
    ) -> Result<Value> {
        self.client
            .request(
                Method::POST,
                self.client.endpoints().create_test_order,
                true,
                Self::order_query(symbol, side, order_type, request),
            )
            .await
    }

    pub async fn create_order(
        &self,
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        request: &OrderRequest,
    ) -> Result<Value> {
        self.client
            .request(
                Method::POST,
                self.client.endpoints().create_order,
                true,
                Self::order_query(symbol, side, order_type, request),
            )
            .await
    }

    pub async fn cancel_order(
        &self,
        symbol: &str,
        order_id: Option<u64>,
        orig_client_order_id: Option<&str>,
        new_client_order_id: Option<&str>,
    ) -> Result<Value> {
        let query = Query::new()
            .push("symbol", symbol)
            .push_num_opt("orderId", order_id)
            .push_opt("origClientOrderId", orig_client_order_id)
            .push_opt("newClientOrderId", new_client_order_id);
        self.client
            .request(
                Method::DELETE,
                self.client.endpoints().cancel_order,
                true,
                query,
            )
            .await
    }

    pub async fn cancel_all_open_orders(&self, symbol: &str) -> Result<Value> {
        let query = Query::new().push("symbol", symbol);
        self.client
            .request(
                Method::DELETE,
                self.client.endpoints().cancel_all_open_orders,
                true,
                query,
            )
            .await
    }

    pub async fn query_order(
        &self,
        symbol: &str,
        order_id: Option<u64>,
        orig_client_order_id: Option<&str>,
    ) -> Result<Value> {
        let query = Query::new()
            .push("symbol", symbol)
            .push_num_opt("orderId", order_id)
            .push_opt("origClientOrderId", orig_client_order_id);
        self.client
            .request(Method::GET, self.client.endpoints().query_order, true, query)
            .await
    }

    /// Cancel an existing order and place a new one atomically.
    pub async fn replace_order(
        &self,
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        cancel_replace_mode: &str,
        cancel_order_id: Option<u64>,
        cancel_orig_client_order_id: Option<&str>,
        request: &OrderRequest,
    ) -> Result<Value> {
        let query = Self::order_query(symbol, side, order_type, request)
            .push("cancelReplaceMode", cancel_replace_mode)
            .push_num_opt("cancelOrderId", cancel_order_id)
            .push_opt("cancelOrigClientOrderId", cancel_orig_client_order_id);
        self.client
            .request(
                Method::POST,
                self.client.endpoints().replace_order,
                true,
                query,
            )
            .await
    }

    pub async fn open_orders(&self, symbol: Option<&str>) -> Result<Value> {
        let query = Query::new().push_opt("symbol", symbol);
        self.client
            .request(Method::GET, self.client.endpoints().open_orders, true, query)
            .await
    }

    pub async fn all_orders(
        &self,
        symbol: &str,
        order_id: Option<u64>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Value> {
        let query = Query::new()
            .push("symbol", symbol)
            .push_num_opt("orderId", order_id)
            .push_num_opt("startTime", start_time)
            .push_num_opt("endTime", end_time)
            .push_num_opt("limit", limit);
        self.client
            .request(Method::GET, self.client.endpoints().all_orders, true, query)
            .await
    }

    pub async fn create_oco_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: f64,
        price: f64,
        stop_price: f64,
        request: &OcoOrderRequest,
    ) -> Result<Value> {
        let query = Query::new()
            .push("symbol", symbol)
            .push_opt("listClientOrderId", request.list_client_order_id.clone())
            .push("side", side.as_str())
            .push_num("quantity", quantity)
            .push_opt("limitClientOrderId", request.limit_client_order_id.clone())
            .push_num_opt("limitStrategyId", request.limit_strategy_id)
            .push_num_opt("limitStrategyType", request.limit_strategy_type)
            .push_num("price", price)
            .push_num_opt("limitIcebergQty", request.limit_iceberg_qty)
            .push_num_opt("trailingDelta", request.trailing_delta)
            .push_opt("stopClientOrderId", request.stop_client_order_id.clone())
            .push_num("stopPrice", stop_price)
            .push_num_opt("stopStrategyId", request.stop_strategy_id)
            .push_num_opt("stopStrategyType", request.stop_strategy_type)
            .push_num_opt("stopLimitPrice", request.stop_limit_price)
            .push_num_opt("stopIcebergQty", request.stop_iceberg_qty)
            .push_opt(
                "stopLimitTimeInForce",
                request.stop_limit_time_in_force.clone(),
            )
            .push_opt("newOrderRespType", request.new_order_resp_type.clone());
        self.client
            .request(
                Method::POST,
                self.client.endpoints().create_oco_order,
                true,
                query,
            )
            .await
    }

    pub async fn cancel_oco_order(
        &self,
        symbol: &str,
        order_list_id: Option<u64>,
        list_client_order_id: Option<&str>,
        new_client_order_id: Option<&str>,
    ) -> Result<Value> {
        let query = Query::new()
            .push("symbol", symbol)
            .push_num_opt("orderListId", order_list_id)
            .push_opt("listClientOrderId", list_client_order_id)
            .push_opt("newClientOrderId", new_client_order_id);
        self.client
            .request(
                Method::DELETE,
                self.client.endpoints().cancel_oco_order,
                true,
                query,
            )
            .await
    }

    pub async fn query_oco_order(
        &self,
        order_list_id: Option<u64>,
        orig_client_order_id: Option<&str>,
    ) -> Result<Value> {
        let query = Query::new()
            .push_num_opt("orderListId", order_list_id)
            .push_opt("origClientOrderId", orig_client_order_id);
        self.client
            .request(
                Method::GET,
                self.client.endpoints().query_oco_order,
                true,
                query,
            )
            .await
    }

    pub async fn query_all_oco_order(
        &self,
        from_id: Option<u64>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Value> {
        let query = Query::new()
            .push_num_opt("fromId", from_id)
            .push_num_opt("startTime", start_time)
            .push_num_opt("endTime", end_time)
            .push_num_opt("limit", limit);
        self.client
            .request(
                Method::GET,
                self.client.endpoints().query_all_oco_order,
                true,
                query,
            )
            .await
    }

    pub async fn query_open_oco_order(&self) -> Result<Value> {
        self.client
            .request(
                Method::GET,
                self.client.endpoints().query_open_oco_order,
                true,
                Query::new(),
            )
            .await
    }

    pub async fn account_info(&self) -> Result<Value> {
        self.client
            .request(
                Method::GET,
                self.client.endpoints().account_info,
                true,
                Query::new(),
            )
            .await
    }

    pub async fn account_trade_list(
        &self,
        symbol: &str,
        order_id: Option<u64>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        from_id: Option<u64>,
        limit: Option<u32>,
    ) -> Result<Value> {
        let query = Query::new()
            .push("symbol", symbol)
            .push_num_opt("orderId", order_id)
            .push_num_opt("startTime", start_time)
            .push_num_opt("endTime", end_time)
            .push_num_opt("fromId", from_id)
            .push_num_opt("limit", limit);
        self.client
            .request(
                Method::GET,
                self.client.endpoints().account_trade_list,
                true,
                query,
            )
            .await
    }

    pub async fn order_rate_limit(&self) -> Result<Value> {
        self.client
            .request(
                Method::GET,
                self.client.endpoints().order_rate_limit,
                true,
                Query::new(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_and_type_rendering() {
        assert_eq!(OrderSide::Buy.as_str(), "BUY");
        assert_eq!(OrderSide::Sell.as_str(), "SELL");
        assert_eq!(OrderType::StopLossLimit.as_str(), "STOP_LOSS_LIMIT");
        assert_eq!(OrderType::LimitMaker.as_str(), "LIMIT_MAKER");
    }

    #[test]
    fn test_order_query_skips_unset_fields() {
        let request = OrderRequest {
            time_in_force: Some("GTC".to_string()),
            quantity: Some(1.0),
            price: Some(0.1),
            ..OrderRequest::default()
        };
        let query = Spot::order_query("LTCBTC", OrderSide::Buy, OrderType::Limit, &request);
        let keys: Vec<&str> = query.pairs().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["symbol", "side", "type", "timeInForce", "quantity", "price"]
        );
        assert_eq!(query.pairs()[4].1, "1");
        assert_eq!(query.pairs()[5].1, "0.1");
    }
}
