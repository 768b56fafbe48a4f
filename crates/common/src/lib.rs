//! Shared value types used across the commerce backend crates.

mod caller;
mod ids;
mod money;

pub use caller::{CallerContext, ParseRoleError, Role};
pub use ids::{AccountId, CategoryId, OrderId, OrderItemId, ProductId, ShippingDetailsId};
pub use money::Money;
