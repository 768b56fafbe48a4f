//! Shared application state.

use std::sync::Arc;

use auth::{Authenticator, TokenService};
use domain::{AccessPolicy, AccountService, CatalogService, OrderService};
use store::CommerceStore;

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub authenticator: Authenticator<S>,
    pub accounts: AccountService<S>,
    pub catalog: CatalogService<S>,
    pub orders: OrderService<S>,
}

impl<S: CommerceStore> AppState<S> {
    /// Wires every service over one store.
    pub fn new(store: S, tokens: TokenService, policy: AccessPolicy) -> Arc<Self> {
        Arc::new(Self {
            authenticator: Authenticator::new(store.clone(), tokens.clone()),
            accounts: AccountService::new(store.clone(), tokens),
            catalog: CatalogService::new(store.clone()),
            orders: OrderService::new(store, policy),
        })
    }
}
