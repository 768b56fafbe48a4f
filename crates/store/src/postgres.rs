use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::{
    Account, AccountChanges, AccountId, Category, CategoryId, Money, NewAccount, NewCategory,
    NewOrder, NewOrderItem, NewProduct, Order, OrderId, OrderItem, OrderItemId, Product,
    ProductId, Result, ShippingAddress, ShippingDetails, ShippingDetailsId, StoreError,
    store::{AccountStore, CatalogStore, OrderStore, OrderTransaction},
};

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, role, first_name, last_name, date_of_birth, created_at, updated_at";
const PRODUCT_COLUMNS: &str =
    "id, name, description, price_cents, category_id, created_at, updated_at";
const ORDER_ITEM_COLUMNS: &str =
    "id, status, product_id, order_id, shipping_details_id, quantity, created_at, updated_at";

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_account(row: PgRow) -> Result<Account> {
        let role: String = row.try_get("role")?;
        Ok(Account {
            id: AccountId::new(row.try_get("id")?),
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: role.parse()?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            date_of_birth: row.try_get("date_of_birth")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_category(row: PgRow) -> Result<Category> {
        Ok(Category {
            id: CategoryId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            category_id: CategoryId::new(row.try_get("category_id")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_order(row: &PgRow) -> Result<Order> {
        Ok(Order {
            id: OrderId::new(row.try_get("id")?),
            total: Money::from_cents(row.try_get("total_cents")?),
            account_id: AccountId::new(row.try_get("account_id")?),
            items: Vec::new(),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_order_item(row: PgRow) -> Result<OrderItem> {
        let status: String = row.try_get("status")?;
        Ok(OrderItem {
            id: OrderItemId::new(row.try_get("id")?),
            status: status.parse()?,
            product_id: ProductId::new(row.try_get("product_id")?),
            order_id: OrderId::new(row.try_get("order_id")?),
            shipping_details_id: ShippingDetailsId::new(row.try_get("shipping_details_id")?),
            quantity: row.try_get("quantity")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_shipping_details(row: PgRow) -> Result<ShippingDetails> {
        Ok(ShippingDetails {
            id: ShippingDetailsId::new(row.try_get("id")?),
            order_id: OrderId::new(row.try_get("order_id")?),
            address: ShippingAddress {
                address_line1: row.try_get("address_line1")?,
                address_line2: row.try_get("address_line2")?,
                postal_code: row.try_get("postal_code")?,
                city: row.try_get("city")?,
                country: row.try_get("country")?,
                notes: row.try_get("notes")?,
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl AccountStore for PostgresStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO accounts (email, password_hash, role, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(&account.first_name)
        .bind(&account.last_name)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_account(row)
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?
        .map(Self::row_to_account)
        .transpose()
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(Self::row_to_account)
        .transpose()
    }

    async fn update_account(&self, id: AccountId, changes: AccountChanges) -> Result<Account> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE accounts SET
                email = COALESCE($1, email),
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                date_of_birth = COALESCE($4, date_of_birth),
                updated_at = NOW()
            WHERE id = $5
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(&changes.email)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(changes.date_of_birth)
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_account(row),
            None => Err(StoreError::NotFound {
                entity: "account",
                id: id.as_i64(),
            }),
        }
    }

    async fn delete_account(&self, id: AccountId) -> Result<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "account",
                id: id.as_i64(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        let row = sqlx::query(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(&category.name)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_category(row)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        sqlx::query("SELECT id, name, created_at, updated_at FROM categories WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .map(Self::row_to_category)
            .transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, created_at, updated_at FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_category).collect()
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (name, description, price_cents, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.cents())
        .bind(product.category_id.as_i64())
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_product(row)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?
        .map(Self::row_to_product)
        .transpose()
    }

    async fn get_prices(&self, ids: &[ProductId]) -> Result<HashMap<ProductId, Money>> {
        let raw_ids: Vec<i64> = ids.iter().map(ProductId::as_i64).collect();

        let rows = sqlx::query("SELECT id, price_cents FROM products WHERE id = ANY($1)")
            .bind(raw_ids)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok((
                    ProductId::new(row.try_get("id")?),
                    Money::from_cents(row.try_get("price_cents")?),
                ))
            })
            .collect()
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    type Transaction = PgOrderTransaction;

    async fn begin(&self) -> Result<PgOrderTransaction> {
        Ok(PgOrderTransaction {
            tx: self.pool.begin().await?,
        })
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let Some(row) = sqlx::query(
            "SELECT id, total_cents, account_id, created_at, updated_at FROM orders WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let mut order = Self::row_to_order(&row)?;

        let rows = sqlx::query(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id ASC"
        ))
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        order.items = rows
            .into_iter()
            .map(Self::row_to_order_item)
            .collect::<Result<_>>()?;

        Ok(Some(order))
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        // order_items and shipping_details cascade from orders
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Transaction handle over a pooled PostgreSQL connection.
///
/// Dropping the handle without committing rolls the transaction back.
pub struct PgOrderTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTransaction for PgOrderTransaction {
    async fn insert_order(&mut self, order: NewOrder) -> Result<Order> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (total_cents, account_id)
            VALUES ($1, $2)
            RETURNING id, total_cents, account_id, created_at, updated_at
            "#,
        )
        .bind(order.total.cents())
        .bind(order.account_id.as_i64())
        .fetch_one(&mut *self.tx)
        .await?;

        PostgresStore::row_to_order(&row)
    }

    async fn insert_shipping_details(
        &mut self,
        order_id: OrderId,
        address: &ShippingAddress,
    ) -> Result<ShippingDetails> {
        let row = sqlx::query(
            r#"
            INSERT INTO shipping_details (order_id, address_line1, address_line2, postal_code, city, country, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, order_id, address_line1, address_line2, postal_code, city, country, notes, created_at, updated_at
            "#,
        )
        .bind(order_id.as_i64())
        .bind(&address.address_line1)
        .bind(&address.address_line2)
        .bind(&address.postal_code)
        .bind(&address.city)
        .bind(&address.country)
        .bind(&address.notes)
        .fetch_one(&mut *self.tx)
        .await?;

        PostgresStore::row_to_shipping_details(row)
    }

    async fn insert_order_item(&mut self, item: NewOrderItem) -> Result<OrderItem> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO order_items (product_id, order_id, shipping_details_id, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING {ORDER_ITEM_COLUMNS}
            "#
        ))
        .bind(item.product_id.as_i64())
        .bind(item.order_id.as_i64())
        .bind(item.shipping_details_id.as_i64())
        .bind(item.quantity)
        .fetch_one(&mut *self.tx)
        .await?;

        PostgresStore::row_to_order_item(row)
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
