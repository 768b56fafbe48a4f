//! Product catalog management.

use common::{CategoryId, Money, ProductId};
use store::{Category, CatalogStore, NewCategory, NewProduct, Product, StoreError};
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("name is required")]
    MissingName,

    #[error("Invalid price: {price} (must be greater than 0)")]
    InvalidPrice { price: Money },

    #[error("a category with this name already exists")]
    CategoryExists,

    #[error("Category not found: {category_id}")]
    CategoryNotFound { category_id: CategoryId },

    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: ProductId },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Service for managing categories and products.
#[derive(Debug, Clone)]
pub struct CatalogService<S> {
    store: S,
}

impl<S: CatalogStore> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<Category, CatalogError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::MissingName);
        }

        self.store
            .create_category(NewCategory {
                name: name.to_string(),
            })
            .await
            .map_err(|e| {
                if e.is_unique_violation_on("categories_name_key") {
                    CatalogError::CategoryExists
                } else {
                    e.into()
                }
            })
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_category(&self, category_id: CategoryId) -> Result<Category, CatalogError> {
        self.store
            .get_category(category_id)
            .await?
            .ok_or(CatalogError::CategoryNotFound { category_id })
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(self.store.list_categories().await?)
    }

    #[tracing::instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        if product.name.trim().is_empty() {
            return Err(CatalogError::MissingName);
        }
        if !product.price.is_positive() {
            return Err(CatalogError::InvalidPrice {
                price: product.price,
            });
        }

        let category_id = product.category_id;
        self.store
            .create_product(product)
            .await
            .map_err(|e| match e {
                StoreError::ForeignKeyViolation { .. } => {
                    CatalogError::CategoryNotFound { category_id }
                }
                other => other.into(),
            })
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Product, CatalogError> {
        self.store
            .get_product(product_id)
            .await?
            .ok_or(CatalogError::ProductNotFound { product_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::InMemoryStore;

    fn product(name: &str, cents: i64, category_id: CategoryId) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: String::new(),
            price: Money::from_cents(cents),
            category_id,
        }
    }

    #[tokio::test]
    async fn category_names_are_unique() {
        let catalog = CatalogService::new(InMemoryStore::new());
        catalog.create_category("Tools").await.unwrap();

        let err = catalog.create_category(" Tools ").await.unwrap_err();
        assert!(matches!(err, CatalogError::CategoryExists));
    }

    #[tokio::test]
    async fn product_price_must_be_positive() {
        let catalog = CatalogService::new(InMemoryStore::new());
        let category = catalog.create_category("Tools").await.unwrap();

        for cents in [0, -100] {
            let err = catalog
                .create_product(product("Hammer", cents, category.id))
                .await
                .unwrap_err();
            assert!(matches!(err, CatalogError::InvalidPrice { .. }));
        }
    }

    #[tokio::test]
    async fn product_requires_existing_category() {
        let catalog = CatalogService::new(InMemoryStore::new());

        let err = catalog
            .create_product(product("Hammer", 1000, CategoryId::new(42)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::CategoryNotFound { category_id } if category_id == CategoryId::new(42)
        ));
    }

    #[tokio::test]
    async fn created_product_is_readable() {
        let catalog = CatalogService::new(InMemoryStore::new());
        let category = catalog.create_category("Tools").await.unwrap();
        let created = catalog
            .create_product(product("Hammer", 1000, category.id))
            .await
            .unwrap();

        let loaded = catalog.get_product(created.id).await.unwrap();
        assert_eq!(loaded, created);
        assert!(matches!(
            catalog.get_product(ProductId::new(999)).await,
            Err(CatalogError::ProductNotFound { .. })
        ));
    }
}
