//! HTTP API server for the commerce backend.
//!
//! Provides REST endpoints for accounts, the catalog, and orders, with
//! bearer-token authentication, structured logging (tracing), and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use store::CommerceStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError, LogFormat};
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
///
/// A request that exceeds `request_timeout` is answered with 408 and its
/// handler future is dropped, which rolls back any open order transaction.
pub fn create_app<S: CommerceStore>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let public = Router::new()
        .route("/health", get(routes::health::check))
        .route("/auth/register", post(routes::auth::register::<S>))
        .route("/auth/login", post(routes::auth::login::<S>))
        .route("/accounts/{id}", get(routes::accounts::get::<S>))
        .route("/categories", get(routes::catalog::list_categories::<S>))
        .route("/categories/{id}", get(routes::catalog::get_category::<S>))
        .route("/products/{id}", get(routes::catalog::get_product::<S>));

    let admin = Router::new()
        .route("/categories", post(routes::catalog::create_category::<S>))
        .route("/products", post(routes::catalog::create_product::<S>))
        .route_layer(axum::middleware::from_fn(middleware::require_admin));

    let authenticated = Router::new()
        .route(
            "/accounts/me",
            get(routes::accounts::me::<S>)
                .put(routes::accounts::update_me::<S>)
                .delete(routes::accounts::delete_me::<S>),
        )
        .route("/orders", post(routes::orders::create::<S>))
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S>).delete(routes::orders::delete::<S>),
        )
        .merge(admin)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth::<S>,
        ));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .fallback(routes::not_found)
        .with_state(state)
        .merge(metrics_router)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
