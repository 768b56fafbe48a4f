pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use common::{AccountId, CategoryId, Money, OrderId, OrderItemId, ProductId, Role, ShippingDetailsId};
pub use error::{Result, StoreError};
pub use memory::{InMemoryOrderTransaction, InMemoryStore};
pub use model::{
    Account, AccountChanges, Category, NewAccount, NewCategory, NewOrder, NewOrderItem,
    NewProduct, Order, OrderItem, OrderItemStatus, Product, ShippingAddress, ShippingDetails,
};
pub use postgres::{PgOrderTransaction, PostgresStore};
pub use store::{AccountStore, CatalogStore, CommerceStore, OrderStore, OrderTransaction};
