//! Order placement and guarded order access endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use common::{AccountId, CallerContext, OrderId, OrderItemId, ProductId, ShippingDetailsId};
use domain::LineItemRequest;
use serde::{Deserialize, Serialize};
use store::{CommerceStore, Order, OrderItem, OrderItemStatus};

use super::parse_id;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

// -- Request types --

/// Body of `POST /orders`. The owner and the prices are never taken from it.
#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<LineItemRequest>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub account_id: AccountId,
    pub total_cents: i64,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub id: OrderItemId,
    pub status: OrderItemStatus,
    pub product_id: ProductId,
    pub shipping_details_id: ShippingDetailsId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            status: item.status,
            product_id: item.product_id,
            shipping_details_id: item.shipping_details_id,
            quantity: item.quantity,
            created_at: item.created_at,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            account_id: order.account_id,
            total_cents: order.total.cents(),
            items: order.items.into_iter().map(Into::into).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

// -- Handlers --

/// POST /orders: place an order for the caller.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<CallerContext>,
    JsonBody(req): JsonBody<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let order = state.orders.place_order(&caller, req.items).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders/{id}: visible to the owner and to admins.
#[tracing::instrument(skip(state))]
pub async fn get<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state
        .orders
        .get_order(&caller, parse_id(&id, "order")?)
        .await?;
    Ok(Json(order.into()))
}

/// DELETE /orders/{id}: owner only, unless admin deletion is enabled.
#[tracing::instrument(skip(state))]
pub async fn delete<S: CommerceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .orders
        .delete_order(&caller, parse_id(&id, "order")?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
