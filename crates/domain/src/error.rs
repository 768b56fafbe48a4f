//! Domain error types.

use thiserror::Error;

use crate::account::AccountError;
use crate::catalog::CatalogError;
use crate::order::OrderError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred placing or accessing an order.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// An error occurred in an account operation.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// An error occurred in a catalog operation.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
