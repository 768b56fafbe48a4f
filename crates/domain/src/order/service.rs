//! Order service: atomic placement plus guarded read and delete.

use std::time::Instant;

use common::{AccountId, CallerContext, Money, OrderId, ProductId};
use serde::Deserialize;
use store::{
    CatalogStore, NewOrder, NewOrderItem, Order, OrderStore, OrderTransaction, ShippingAddress,
};

use super::access::{Access, AccessPolicy, OrderAction};
use super::OrderError;
use crate::pricing::{PriceAuthority, PriceList};

/// One requested order line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LineItemRequest {
    pub product_id: ProductId,
    pub quantity: i32,
    pub shipping: ShippingAddress,
}

/// Service for placing and accessing orders.
///
/// The owning account is always taken from the caller context, and the total
/// is always computed from catalog prices.
#[derive(Debug, Clone)]
pub struct OrderService<S> {
    store: S,
    prices: PriceAuthority<S>,
    policy: AccessPolicy,
}

impl<S> OrderService<S>
where
    S: CatalogStore + OrderStore + Clone,
{
    /// Creates a new order service with the given store and access policy.
    pub fn new(store: S, policy: AccessPolicy) -> Self {
        Self {
            prices: PriceAuthority::new(store.clone()),
            store,
            policy,
        }
    }

    /// Places an order for the caller.
    ///
    /// Either the header, every shipping record, and every line are all
    /// persisted, or none of them are.
    #[tracing::instrument(skip(self, items), fields(account_id = %caller.account_id, items = items.len()))]
    pub async fn place_order(
        &self,
        caller: &CallerContext,
        items: Vec<LineItemRequest>,
    ) -> Result<Order, OrderError> {
        let started = Instant::now();
        let result = self.place(caller.account_id, &items).await;

        match &result {
            Ok(order) => {
                metrics::counter!("orders_placed_total").increment(1);
                metrics::histogram!("order_placement_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                tracing::info!(order_id = %order.id, total = %order.total, "order placed");
            }
            Err(OrderError::Store(e)) => {
                metrics::counter!("order_placement_failures_total", "reason" => "store")
                    .increment(1);
                tracing::error!(error = %e, "order placement failed");
            }
            Err(e) => {
                metrics::counter!("order_placement_failures_total", "reason" => e.reason())
                    .increment(1);
                tracing::info!(error = %e, "order placement rejected");
            }
        }

        result
    }

    async fn place(
        &self,
        account_id: AccountId,
        items: &[LineItemRequest],
    ) -> Result<Order, OrderError> {
        validate(items)?;

        let prices = self
            .prices
            .resolve(items.iter().map(|item| item.product_id))
            .await?;
        let total = compute_total(items, &prices)?;

        let mut tx = self.store.begin().await?;
        match write_order(&mut tx, account_id, total, items).await {
            Ok(order) => {
                tx.commit().await?;
                Ok(order)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback after failed placement also failed");
                }
                Err(err)
            }
        }
    }

    /// Loads an order the caller owns, or any order if the caller is an admin.
    ///
    /// Orders the caller may not see are reported as not found.
    #[tracing::instrument(skip(self), fields(account_id = %caller.account_id))]
    pub async fn get_order(
        &self,
        caller: &CallerContext,
        order_id: OrderId,
    ) -> Result<Order, OrderError> {
        self.load_for(caller, order_id, OrderAction::Read).await
    }

    /// Deletes an order together with its lines and shipping records.
    #[tracing::instrument(skip(self), fields(account_id = %caller.account_id))]
    pub async fn delete_order(
        &self,
        caller: &CallerContext,
        order_id: OrderId,
    ) -> Result<(), OrderError> {
        self.load_for(caller, order_id, OrderAction::Delete).await?;

        if !self.store.delete_order(order_id).await? {
            return Err(OrderError::NotFound { order_id });
        }

        tracing::info!(%order_id, "order deleted");
        Ok(())
    }

    async fn load_for(
        &self,
        caller: &CallerContext,
        order_id: OrderId,
        action: OrderAction,
    ) -> Result<Order, OrderError> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(OrderError::NotFound { order_id })?;

        match self.policy.check(caller, order.account_id, action) {
            Access::Granted => Ok(order),
            Access::Hidden => {
                tracing::info!(%order_id, %action, "order access refused");
                Err(OrderError::NotFound { order_id })
            }
            Access::Denied => {
                tracing::info!(%order_id, %action, "order action refused by policy");
                Err(OrderError::Forbidden { order_id, action })
            }
        }
    }
}

fn validate(items: &[LineItemRequest]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::NoItems);
    }
    if let Some(item) = items.iter().find(|item| item.quantity < 1) {
        return Err(OrderError::InvalidQuantity {
            quantity: item.quantity,
        });
    }
    Ok(())
}

fn compute_total(items: &[LineItemRequest], prices: &PriceList) -> Result<Money, OrderError> {
    items.iter().try_fold(Money::zero(), |total, item| {
        let price = prices
            .price_of(item.product_id)
            .ok_or(OrderError::ProductNotFound {
                product_id: item.product_id,
            })?;
        price
            .checked_multiply(i64::from(item.quantity))
            .and_then(|line| total.checked_add(line))
            .ok_or(OrderError::TotalOutOfRange)
    })
}

async fn write_order<T: OrderTransaction>(
    tx: &mut T,
    account_id: AccountId,
    total: Money,
    items: &[LineItemRequest],
) -> Result<Order, OrderError> {
    let mut order = tx.insert_order(NewOrder { account_id, total }).await?;

    for item in items {
        let shipping = tx.insert_shipping_details(order.id, &item.shipping).await?;
        let line = tx
            .insert_order_item(NewOrderItem {
                order_id: order.id,
                product_id: item.product_id,
                shipping_details_id: shipping.id,
                quantity: item.quantity,
            })
            .await?;
        order.items.push(line);
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn line(product: i64, quantity: i32) -> LineItemRequest {
        LineItemRequest {
            product_id: ProductId::new(product),
            quantity,
            shipping: ShippingAddress {
                address_line1: "1 Main St".to_string(),
                address_line2: None,
                postal_code: "12345".to_string(),
                city: "Springfield".to_string(),
                country: "US".to_string(),
                notes: None,
            },
        }
    }

    #[test]
    fn empty_request_is_rejected() {
        assert!(matches!(validate(&[]), Err(OrderError::NoItems)));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        for quantity in [0, -3] {
            let result = validate(&[line(1, 1), line(2, quantity)]);
            assert!(matches!(
                result,
                Err(OrderError::InvalidQuantity { quantity: q }) if q == quantity
            ));
        }
    }

    #[test]
    fn total_sums_quantity_times_price() {
        let prices = price_list(&[(1, 1000), (2, 550)]);
        let total = compute_total(&[line(1, 2), line(2, 1)], &prices).unwrap();
        assert_eq!(total, Money::from_cents(2550));
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let prices = price_list(&[(1, i64::MAX / 2)]);
        let result = compute_total(&[line(1, 3)], &prices);
        assert!(matches!(result, Err(OrderError::TotalOutOfRange)));
    }

    fn price_list(entries: &[(i64, i64)]) -> PriceList {
        let prices: HashMap<ProductId, Money> = entries
            .iter()
            .map(|(id, cents)| (ProductId::new(*id), Money::from_cents(*cents)))
            .collect();
        PriceList::from(prices)
    }
}
