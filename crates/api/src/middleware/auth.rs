//! Authorization gate wiring.
//!
//! [`require_auth`] is the only place a [`CallerContext`] is inserted into a
//! request. Handlers behind it read the context with `Extension<CallerContext>`.

use std::sync::Arc;

use auth::{AuthError, Role};
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use common::CallerContext;
use store::CommerceStore;

use crate::error::ApiError;
use crate::state::AppState;

/// Verifies the bearer token and attaches the caller's identity to the request.
pub async fn require_auth<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = match req.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| {
                    tracing::warn!("authorization header is not valid UTF-8");
                    AuthError::MalformedCredential
                })?
                .to_owned(),
        ),
    };

    let caller = state.authenticator.authenticate(header.as_deref()).await?;

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// Requires an authenticated caller holding the admin role.
///
/// Must be layered inside [`require_auth`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let caller = req
        .extensions()
        .get::<CallerContext>()
        .copied()
        .ok_or(AuthError::MissingCredential)?;

    auth::require_role(&caller, Role::Admin)?;
    Ok(next.run(req).await)
}
