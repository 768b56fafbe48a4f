//! Persisted record types and the inputs used to create them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    AccountId, CategoryId, Money, OrderId, OrderItemId, ProductId, Role, ShippingDetailsId,
    StoreError,
};

/// A registered account.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[redacted]")
            .field("role", &self.role)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("date_of_birth", &self.date_of_birth)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Input for creating an account. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: Option<String>,
}

/// Partial profile update; `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category_id: CategoryId,
}

/// Fulfilment status of a single order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderItemStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderItemStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderItemStatus::Pending => "pending",
            OrderItemStatus::Processing => "processing",
            OrderItemStatus::Shipped => "shipped",
            OrderItemStatus::Delivered => "delivered",
            OrderItemStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderItemStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderItemStatus::Pending),
            "processing" => Ok(OrderItemStatus::Processing),
            "shipped" => Ok(OrderItemStatus::Shipped),
            "delivered" => Ok(OrderItemStatus::Delivered),
            "cancelled" => Ok(OrderItemStatus::Cancelled),
            other => Err(StoreError::Corrupt(format!("unknown order item status: {other}"))),
        }
    }
}

/// An order header together with its lines in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub total: Money,
    pub account_id: AccountId,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewOrder {
    pub account_id: AccountId,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub status: OrderItemStatus,
    pub product_id: ProductId,
    pub order_id: OrderId,
    pub shipping_details_id: ShippingDetailsId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub shipping_details_id: ShippingDetailsId,
    pub quantity: i32,
}

/// Where a single order line is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A persisted shipping record. Each order line owns exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingDetails {
    pub id: ShippingDetailsId,
    pub order_id: OrderId,
    pub address: ShippingAddress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_persisted_form() {
        for status in [
            OrderItemStatus::Pending,
            OrderItemStatus::Processing,
            OrderItemStatus::Shipped,
            OrderItemStatus::Delivered,
            OrderItemStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderItemStatus>().unwrap(), status);
        }
        assert!(matches!(
            "lost".parse::<OrderItemStatus>(),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn new_items_default_to_pending() {
        assert_eq!(OrderItemStatus::default(), OrderItemStatus::Pending);
    }

    #[test]
    fn account_debug_redacts_password_hash() {
        let now = Utc::now();
        let account = Account {
            id: AccountId::new(1),
            email: "a@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Customer,
            first_name: "Ada".to_string(),
            last_name: None,
            date_of_birth: None,
            created_at: now,
            updated_at: now,
        };
        let rendered = format!("{account:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("[redacted]"));
    }
}
