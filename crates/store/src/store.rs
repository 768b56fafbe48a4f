use std::collections::HashMap;

use async_trait::async_trait;

use crate::{
    Account, AccountChanges, AccountId, Category, CategoryId, Money, NewAccount, NewCategory,
    NewOrder, NewOrderItem, NewProduct, Order, OrderId, OrderItem, Product, ProductId, Result,
    ShippingAddress, ShippingDetails,
};

/// Account persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Creates an account.
    ///
    /// Fails with `UniqueViolation` if the email is already registered.
    async fn create_account(&self, account: NewAccount) -> Result<Account>;

    /// Looks up an account by id. Returns None if it does not exist.
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>>;

    /// Looks up an account by email. Returns None if it does not exist.
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Applies a partial profile update and returns the updated record.
    ///
    /// Fails with `NotFound` if the account does not exist.
    async fn update_account(&self, id: AccountId, changes: AccountChanges) -> Result<Account>;

    /// Deletes an account together with the orders it owns.
    ///
    /// Fails with `NotFound` if the account does not exist.
    async fn delete_account(&self, id: AccountId) -> Result<()>;
}

/// Catalog persistence. Read-only from the order placement path.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create_category(&self, category: NewCategory) -> Result<Category>;

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>>;

    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Creates a product. Fails with `ForeignKeyViolation` for an unknown category.
    async fn create_product(&self, product: NewProduct) -> Result<Product>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Resolves current prices for a batch of products in a single lookup.
    ///
    /// Ids that do not exist are absent from the returned map.
    async fn get_prices(&self, ids: &[ProductId]) -> Result<HashMap<ProductId, Money>>;
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Transaction handle type produced by [`OrderStore::begin`].
    type Transaction: OrderTransaction;

    /// Begins a transaction exclusively owned by the caller.
    async fn begin(&self) -> Result<Self::Transaction>;

    /// Loads an order header and its lines in insertion order.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Deletes an order along with its lines and their shipping records.
    ///
    /// Returns false if no such order exists.
    async fn delete_order(&self, id: OrderId) -> Result<bool>;
}

/// A single storage transaction used for order placement.
///
/// Writes are invisible to other readers until [`commit`](Self::commit).
/// `commit` and `rollback` consume the handle so it cannot be reused, and
/// dropping an uncommitted handle discards every staged write.
#[async_trait]
pub trait OrderTransaction: Send {
    /// Inserts an order header and returns it with its generated id and no items.
    async fn insert_order(&mut self, order: NewOrder) -> Result<Order>;

    async fn insert_shipping_details(
        &mut self,
        order_id: OrderId,
        address: &ShippingAddress,
    ) -> Result<ShippingDetails>;

    async fn insert_order_item(&mut self, item: NewOrderItem) -> Result<OrderItem>;

    async fn commit(self) -> Result<()>;

    async fn rollback(self) -> Result<()>;
}

/// Everything the HTTP layer needs from a backing store.
pub trait CommerceStore: AccountStore + CatalogStore + OrderStore + Clone + 'static {}

impl<T> CommerceStore for T where T: AccountStore + CatalogStore + OrderStore + Clone + 'static {}
