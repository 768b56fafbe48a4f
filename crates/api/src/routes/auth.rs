//! Registration and login.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::{Registration, Session};
use serde::{Deserialize, Serialize};
use store::CommerceStore;

use super::accounts::AccountResponse;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub account: AccountResponse,
    pub token: String,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            account: session.account.into(),
            token: session.token,
        }
    }
}

/// POST /auth/register: create a customer account and sign it in.
#[tracing::instrument(skip(state, req))]
pub async fn register<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session = state
        .accounts
        .register(Registration {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// POST /auth/login: exchange email and password for a token.
#[tracing::instrument(skip(state, req))]
pub async fn login<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.accounts.login(&req.email, &req.password).await?;
    Ok(Json(session.into()))
}
