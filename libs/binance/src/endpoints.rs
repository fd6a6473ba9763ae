//! REST endpoint paths, relative to the `/api/` base.

/// Endpoint path table for the spot REST API.
///
/// Kept as a plain struct so alternative deployments (forks, mirrors with
/// a different version prefix) can swap individual paths.
#[derive(Debug, Clone)]
pub struct Endpoints {
    // General
    pub ping: &'static str,
    pub server_time: &'static str,
    pub exchange_info: &'static str,
    // Market data
    pub order_book: &'static str,
    pub recent_trades: &'static str,
    pub old_trades: &'static str,
    pub aggregate_trades: &'static str,
    pub klines: &'static str,
    pub ui_klines: &'static str,
    pub average_price: &'static str,
    pub ticker_24hr: &'static str,
    pub price_ticker: &'static str,
    pub order_book_ticker: &'static str,
    pub rolling_window_ticker: &'static str,
    // Spot account/trade
    pub create_test_order: &'static str,
    pub create_order: &'static str,
    pub cancel_order: &'static str,
    pub cancel_all_open_orders: &'static str,
    pub query_order: &'static str,
    pub replace_order: &'static str,
    pub open_orders: &'static str,
    pub all_orders: &'static str,
    pub create_oco_order: &'static str,
    pub cancel_oco_order: &'static str,
    pub query_oco_order: &'static str,
    pub query_all_oco_order: &'static str,
    pub query_open_oco_order: &'static str,
    pub account_info: &'static str,
    pub account_trade_list: &'static str,
    pub order_rate_limit: &'static str,
    // User data stream
    pub create_listen_key: &'static str,
    pub keep_alive_listen_key: &'static str,
    pub close_listen_key: &'static str,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            ping: "v3/ping",
            server_time: "v3/time",
            exchange_info: "v3/exchangeInfo",
            order_book: "v3/depth",
            recent_trades: "v3/trades",
            old_trades: "v3/historicalTrades",
            aggregate_trades: "v3/aggTrades",
            klines: "v3/klines",
            ui_klines: "v3/uiKlines",
            average_price: "v3/avgPrice",
            ticker_24hr: "v3/ticker/24hr",
            price_ticker: "v3/ticker/price",
            order_book_ticker: "v3/ticker/bookTicker",
            rolling_window_ticker: "v3/ticker",
            create_test_order: "v3/order/test",
            create_order: "v3/order",
            cancel_order: "v3/order",
            cancel_all_open_orders: "v3/openOrders",
            query_order: "v3/order",
            replace_order: "v3/order/cancelReplace",
            open_orders: "v3/openOrders",
            all_orders: "v3/allOrders",
            create_oco_order: "v3/order/oco",
            cancel_oco_order: "v3/orderList",
            query_oco_order: "v3/orderList",
            query_all_oco_order: "v3/allOrderList",
            query_open_oco_order: "v3/openOrderList",
            account_info: "v3/account",
            account_trade_list: "v3/myTrades",
            order_rate_limit: "v3/rateLimit/order",
            create_listen_key: "v3/userDataStream",
            keep_alive_listen_key: "v3/userDataStream",
            close_listen_key: "v3/userDataStream",
        }
    }
}
