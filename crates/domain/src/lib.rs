//! Domain layer for the commerce backend.
//!
//! This crate provides:
//! - The price authority used to total orders from catalog prices
//! - Atomic order placement and owner/admin guarded order access
//! - Account registration, login, and profile management
//! - Category and product management

pub mod account;
pub mod catalog;
pub mod error;
pub mod order;
pub mod pricing;

pub use account::{AccountError, AccountService, MIN_PASSWORD_LENGTH, Registration, Session};
pub use catalog::{CatalogError, CatalogService};
pub use error::DomainError;
pub use order::{AccessPolicy, LineItemRequest, OrderAction, OrderError, OrderService};
pub use pricing::{PriceAuthority, PriceList};
