//! Account profile endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, NaiveDate, Utc};
use common::{AccountId, CallerContext, Role};
use serde::{Deserialize, Serialize};
use store::{Account, AccountChanges, CommerceStore};

use super::parse_id;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

// -- Response types --

/// The caller's own account. Never includes the password hash.
#[derive(Serialize)]
pub struct AccountResponse {
    pub id: AccountId,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            role: account.role,
            first_name: account.first_name,
            last_name: account.last_name,
            date_of_birth: account.date_of_birth,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// What anyone may see about an account.
#[derive(Serialize)]
pub struct PublicProfileResponse {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

// -- Handlers --

/// GET /accounts/{id}: public profile.
#[tracing::instrument(skip(state))]
pub async fn get<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<PublicProfileResponse>, ApiError> {
    let account = state.accounts.get(parse_id(&id, "account")?).await?;

    Ok(Json(PublicProfileResponse {
        id: account.id,
        first_name: account.first_name,
        last_name: account.last_name,
        created_at: account.created_at,
    }))
}

/// GET /accounts/me: the caller's account.
#[tracing::instrument(skip(state))]
pub async fn me<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.accounts.get(caller.account_id).await?;
    Ok(Json(account.into()))
}

/// PUT /accounts/me: partial profile update.
#[tracing::instrument(skip(state, req))]
pub async fn update_me<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<CallerContext>,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let changes = AccountChanges {
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        date_of_birth: req.date_of_birth,
    };

    let account = state
        .accounts
        .update_profile(caller.account_id, changes)
        .await?;
    Ok(Json(account.into()))
}

/// DELETE /accounts/me: removes the caller's account and its orders.
#[tracing::instrument(skip(state))]
pub async fn delete_me<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<CallerContext>,
) -> Result<StatusCode, ApiError> {
    state.accounts.delete(caller.account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
