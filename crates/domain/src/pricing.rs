//! Server-side price resolution.

use std::collections::{HashMap, HashSet};

use common::{Money, ProductId};
use store::CatalogStore;

use crate::order::OrderError;

/// Prices resolved in one catalog lookup, keyed by product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceList {
    prices: HashMap<ProductId, Money>,
}

impl PriceList {
    pub fn price_of(&self, product_id: ProductId) -> Option<Money> {
        self.prices.get(&product_id).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl From<HashMap<ProductId, Money>> for PriceList {
    fn from(prices: HashMap<ProductId, Money>) -> Self {
        Self { prices }
    }
}

/// Supplies the authoritative price of every product on an order.
///
/// Prices are read once per placement and not locked; a concurrent catalog
/// update may leave an order priced at the value read here.
#[derive(Debug, Clone)]
pub struct PriceAuthority<C> {
    catalog: C,
}

impl<C: CatalogStore> PriceAuthority<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Resolves the distinct products in `requested` with a single batch lookup.
    ///
    /// Fails with `ProductNotFound` naming the first requested id the catalog
    /// does not know.
    #[tracing::instrument(skip_all)]
    pub async fn resolve(
        &self,
        requested: impl IntoIterator<Item = ProductId>,
    ) -> Result<PriceList, OrderError> {
        let mut seen = HashSet::new();
        let distinct: Vec<ProductId> = requested
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        let prices = self.catalog.get_prices(&distinct).await?;

        if let Some(missing) = distinct.iter().find(|id| !prices.contains_key(*id)) {
            return Err(OrderError::ProductNotFound {
                product_id: *missing,
            });
        }

        tracing::debug!(products = distinct.len(), "prices resolved");
        Ok(PriceList { prices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::{InMemoryStore, NewCategory, NewProduct};

    async fn seeded() -> (InMemoryStore, ProductId, ProductId) {
        let store = InMemoryStore::new();
        let category = store
            .create_category(NewCategory {
                name: "Tools".to_string(),
            })
            .await
            .unwrap();
        let mut ids = Vec::new();
        for (name, cents) in [("Hammer", 1000), ("Nail", 5)] {
            let product = store
                .create_product(NewProduct {
                    name: name.to_string(),
                    description: String::new(),
                    price: Money::from_cents(cents),
                    category_id: category.id,
                })
                .await
                .unwrap();
            ids.push(product.id);
        }
        (store, ids[0], ids[1])
    }

    #[tokio::test]
    async fn duplicate_ids_resolve_once() {
        let (store, hammer, nail) = seeded().await;
        let authority = PriceAuthority::new(store);

        let prices = authority.resolve([hammer, nail, hammer]).await.unwrap();

        assert_eq!(prices.len(), 2);
        assert_eq!(prices.price_of(hammer), Some(Money::from_cents(1000)));
        assert_eq!(prices.price_of(nail), Some(Money::from_cents(5)));
    }

    #[tokio::test]
    async fn any_unknown_id_fails_the_batch() {
        let (store, hammer, _) = seeded().await;
        let authority = PriceAuthority::new(store);

        let err = authority
            .resolve([hammer, ProductId::new(999)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrderError::ProductNotFound { product_id } if product_id == ProductId::new(999)
        ));
    }
}
