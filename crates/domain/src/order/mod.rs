//! Order placement and guarded access to placed orders.

mod access;
mod service;

pub use access::{AccessPolicy, OrderAction};
pub use service::{LineItemRequest, OrderService};

use common::{OrderId, ProductId};
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request carried no line items.
    #[error("Order has no items")]
    NoItems,

    /// A line item asked for less than one unit.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: i32 },

    /// A requested product is not in the catalog.
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: ProductId },

    /// The order total does not fit the monetary representation.
    #[error("Order total is out of range")]
    TotalOutOfRange,

    /// The order does not exist or the caller may not see it.
    #[error("Order not found: {order_id}")]
    NotFound { order_id: OrderId },

    /// The caller may see the order but not perform the action on it.
    #[error("Not permitted to {action} order {order_id}")]
    Forbidden {
        order_id: OrderId,
        action: OrderAction,
    },

    /// A storage operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl OrderError {
    /// Short label used for the placement failure metric.
    pub fn reason(&self) -> &'static str {
        match self {
            OrderError::NoItems => "no_items",
            OrderError::InvalidQuantity { .. } => "invalid_quantity",
            OrderError::ProductNotFound { .. } => "product_not_found",
            OrderError::TotalOutOfRange => "total_out_of_range",
            OrderError::NotFound { .. } => "not_found",
            OrderError::Forbidden { .. } => "forbidden",
            OrderError::Store(_) => "store",
        }
    }
}
