use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    Account, AccountChanges, AccountId, Category, CategoryId, Money, NewAccount, NewCategory,
    NewOrder, NewOrderItem, NewProduct, Order, OrderId, OrderItem, OrderItemId, OrderItemStatus,
    Product, ProductId, Result, ShippingAddress, ShippingDetails, ShippingDetailsId, StoreError,
    store::{AccountStore, CatalogStore, OrderStore, OrderTransaction},
};

/// Per-table id sequences. Like database sequences, ids consumed by a
/// rolled-back transaction are not reused.
#[derive(Debug, Default)]
struct Sequences {
    accounts: i64,
    categories: i64,
    products: i64,
    orders: i64,
    order_items: i64,
    shipping_details: i64,
}

fn next(sequence: &mut i64) -> i64 {
    *sequence += 1;
    *sequence
}

#[derive(Debug, Default)]
struct Faults {
    /// Fail the n-th (zero-based) item insert within a transaction.
    fail_on_item_insert: Option<usize>,
    fail_on_commit: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
    sequences: Sequences,
    accounts: BTreeMap<AccountId, Account>,
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    /// Order headers; lines live in `order_items`.
    orders: BTreeMap<OrderId, Order>,
    order_items: BTreeMap<OrderItemId, OrderItem>,
    shipping_details: BTreeMap<ShippingDetailsId, ShippingDetails>,
    faults: Faults,
}

impl MemoryState {
    fn email_taken(&self, email: &str, except: Option<AccountId>) -> bool {
        self.accounts
            .values()
            .any(|a| a.email == email && Some(a.id) != except)
    }

    fn remove_order(&mut self, order_id: OrderId) -> bool {
        if self.orders.remove(&order_id).is_none() {
            return false;
        }
        self.order_items.retain(|_, item| item.order_id != order_id);
        self.shipping_details
            .retain(|_, details| details.order_id != order_id);
        true
    }
}

/// In-memory store implementation for testing and local runs.
///
/// This implementation keeps every table in memory and provides the same
/// interface and constraint behaviour as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures transactions to fail when inserting the n-th (zero-based) order item.
    pub async fn fail_on_item_insert(&self, index: Option<usize>) {
        self.state.write().await.faults.fail_on_item_insert = index;
    }

    /// Configures transactions to fail at commit.
    pub async fn set_fail_on_commit(&self, fail: bool) {
        self.state.write().await.faults.fail_on_commit = fail;
    }

    /// Returns the number of committed orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the number of committed order items.
    pub async fn order_item_count(&self) -> usize {
        self.state.read().await.order_items.len()
    }

    /// Returns the number of committed shipping-details records.
    pub async fn shipping_details_count(&self) -> usize {
        self.state.read().await.shipping_details.len()
    }

    /// Returns a committed shipping-details record.
    pub async fn get_shipping_details(&self, id: ShippingDetailsId) -> Option<ShippingDetails> {
        self.state.read().await.shipping_details.get(&id).cloned()
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        let mut state = self.state.write().await;
        if state.email_taken(&account.email, None) {
            return Err(StoreError::UniqueViolation {
                constraint: "accounts_email_key".to_string(),
            });
        }

        let now = Utc::now();
        let record = Account {
            id: AccountId::new(next(&mut state.sequences.accounts)),
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            first_name: account.first_name,
            last_name: account.last_name,
            date_of_birth: None,
            created_at: now,
            updated_at: now,
        };
        state.accounts.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.state.read().await.accounts.get(&id).cloned())
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn update_account(&self, id: AccountId, changes: AccountChanges) -> Result<Account> {
        let mut state = self.state.write().await;
        if let Some(ref email) = changes.email
            && state.email_taken(email, Some(id))
        {
            return Err(StoreError::UniqueViolation {
                constraint: "accounts_email_key".to_string(),
            });
        }

        let account = state
            .accounts
            .get_mut(&id)
            .ok_or(StoreError::NotFound {
                entity: "account",
                id: id.as_i64(),
            })?;

        if let Some(email) = changes.email {
            account.email = email;
        }
        if let Some(first_name) = changes.first_name {
            account.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            account.last_name = Some(last_name);
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            account.date_of_birth = Some(date_of_birth);
        }
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn delete_account(&self, id: AccountId) -> Result<()> {
        let mut state = self.state.write().await;
        if state.accounts.remove(&id).is_none() {
            return Err(StoreError::NotFound {
                entity: "account",
                id: id.as_i64(),
            });
        }

        let owned: Vec<OrderId> = state
            .orders
            .values()
            .filter(|o| o.account_id == id)
            .map(|o| o.id)
            .collect();
        for order_id in owned {
            state.remove_order(order_id);
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        let mut state = self.state.write().await;
        if state.categories.values().any(|c| c.name == category.name) {
            return Err(StoreError::UniqueViolation {
                constraint: "categories_name_key".to_string(),
            });
        }

        let now = Utc::now();
        let record = Category {
            id: CategoryId::new(next(&mut state.sequences.categories)),
            name: category.name,
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.state.read().await.categories.values().cloned().collect())
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&product.category_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "products_category_id_fkey".to_string(),
            });
        }

        let now = Utc::now();
        let record = Product {
            id: ProductId::new(next(&mut state.sequences.products)),
            name: product.name,
            description: product.description,
            price: product.price,
            category_id: product.category_id,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn get_prices(&self, ids: &[ProductId]) -> Result<HashMap<ProductId, Money>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).map(|p| (p.id, p.price)))
            .collect())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    type Transaction = InMemoryOrderTransaction;

    async fn begin(&self) -> Result<InMemoryOrderTransaction> {
        Ok(InMemoryOrderTransaction {
            state: Arc::clone(&self.state),
            orders: Vec::new(),
            shipping_details: Vec::new(),
            order_items: Vec::new(),
        })
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        let Some(header) = state.orders.get(&id) else {
            return Ok(None);
        };

        let mut order = header.clone();
        // BTreeMap iteration is id order, which is insertion order
        order.items = state
            .order_items
            .values()
            .filter(|item| item.order_id == id)
            .cloned()
            .collect();
        Ok(Some(order))
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        Ok(self.state.write().await.remove_order(id))
    }
}

/// Transaction over the in-memory store.
///
/// Writes are staged locally and applied under a single write lock at
/// commit. Dropping the handle discards them.
pub struct InMemoryOrderTransaction {
    state: Arc<RwLock<MemoryState>>,
    orders: Vec<Order>,
    shipping_details: Vec<ShippingDetails>,
    order_items: Vec<OrderItem>,
}

impl InMemoryOrderTransaction {
    fn order_visible(&self, state: &MemoryState, order_id: OrderId) -> bool {
        self.orders.iter().any(|o| o.id == order_id) || state.orders.contains_key(&order_id)
    }
}

#[async_trait]
impl OrderTransaction for InMemoryOrderTransaction {
    async fn insert_order(&mut self, order: NewOrder) -> Result<Order> {
        let mut state = self.state.write().await;
        if !state.accounts.contains_key(&order.account_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "orders_account_id_fkey".to_string(),
            });
        }

        let now = Utc::now();
        let record = Order {
            id: OrderId::new(next(&mut state.sequences.orders)),
            total: order.total,
            account_id: order.account_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.orders.push(record.clone());
        Ok(record)
    }

    async fn insert_shipping_details(
        &mut self,
        order_id: OrderId,
        address: &ShippingAddress,
    ) -> Result<ShippingDetails> {
        let mut state = self.state.write().await;
        if !self.order_visible(&state, order_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "shipping_details_order_id_fkey".to_string(),
            });
        }

        let now = Utc::now();
        let record = ShippingDetails {
            id: ShippingDetailsId::new(next(&mut state.sequences.shipping_details)),
            order_id,
            address: address.clone(),
            created_at: now,
            updated_at: now,
        };
        self.shipping_details.push(record.clone());
        Ok(record)
    }

    async fn insert_order_item(&mut self, item: NewOrderItem) -> Result<OrderItem> {
        let mut state = self.state.write().await;
        if state.faults.fail_on_item_insert == Some(self.order_items.len()) {
            return Err(StoreError::Unavailable(
                "injected failure on order item insert".to_string(),
            ));
        }
        if !state.products.contains_key(&item.product_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "order_items_product_id_fkey".to_string(),
            });
        }
        if !self.order_visible(&state, item.order_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "order_items_order_id_fkey".to_string(),
            });
        }
        if !self
            .shipping_details
            .iter()
            .any(|d| d.id == item.shipping_details_id)
            && !state
                .shipping_details
                .contains_key(&item.shipping_details_id)
        {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "order_items_shipping_details_id_fkey".to_string(),
            });
        }
        if self
            .order_items
            .iter()
            .chain(state.order_items.values())
            .any(|i| i.shipping_details_id == item.shipping_details_id)
        {
            return Err(StoreError::UniqueViolation {
                constraint: "order_items_shipping_details_id_key".to_string(),
            });
        }
        if item.quantity <= 0 {
            return Err(StoreError::CheckViolation {
                constraint: "order_items_quantity_check".to_string(),
            });
        }

        let now = Utc::now();
        let record = OrderItem {
            id: OrderItemId::new(next(&mut state.sequences.order_items)),
            status: OrderItemStatus::Pending,
            product_id: item.product_id,
            order_id: item.order_id,
            shipping_details_id: item.shipping_details_id,
            quantity: item.quantity,
            created_at: now,
            updated_at: now,
        };
        self.order_items.push(record.clone());
        Ok(record)
    }

    async fn commit(self) -> Result<()> {
        let mut state = self.state.write().await;
        if state.faults.fail_on_commit {
            return Err(StoreError::Unavailable(
                "injected failure on commit".to_string(),
            ));
        }

        // Parents may have been deleted since the rows were staged
        if self
            .orders
            .iter()
            .any(|o| !state.accounts.contains_key(&o.account_id))
        {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "orders_account_id_fkey".to_string(),
            });
        }
        if self
            .order_items
            .iter()
            .any(|i| !state.products.contains_key(&i.product_id))
        {
            return Err(StoreError::ForeignKeyViolation {
                constraint: "order_items_product_id_fkey".to_string(),
            });
        }

        for order in self.orders {
            state.orders.insert(order.id, order);
        }
        for details in self.shipping_details {
            state.shipping_details.insert(details.id, details);
        }
        for item in self.order_items {
            state.order_items.insert(item.id, item);
        }
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}
