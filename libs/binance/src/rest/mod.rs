//! REST resource wrappers.
//!
//! Thin parameter-to-request translations over [`crate::client::Client`];
//! every method builds a query and delegates to the generic executor.

mod general;
mod market;
mod spot;

pub use general::General;
pub use market::Market;
pub use spot::{OcoOrderRequest, OrderRequest, OrderSide, OrderType, Spot};
