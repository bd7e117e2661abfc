use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::api::extract::JsonBody;
use crate::auth::{AdminUser, AuthUser};
use crate::domain::{DomainError, Order, OrderStatus};
use crate::infrastructure::AppState;
use crate::services::order_service::{self, PlaceOrderRequest};

#[derive(Deserialize)]
pub struct StatusRequest {
    status: String,
}

#[utoipa::path(
    post,
    path = "/api/orders",
    responses(
        (status = 201, description = "Order placed"),
        (status = 400, description = "Empty cart, bad quantity, missing guest contact or unknown book")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    JsonBody(request): JsonBody<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), DomainError> {
    let order = order_service::place_order(&state, user.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Orders of the signed-in shopper.
pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Order>>, DomainError> {
    Ok(Json(state.order_repo.find_by_user(user.user_id).await?))
}

pub async fn list_all_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<Order>>, DomainError> {
    Ok(Json(state.order_repo.find_all().await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{id}/status",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Status changed"),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    JsonBody(request): JsonBody<StatusRequest>,
) -> Result<Json<Order>, DomainError> {
    let status = request.status.parse::<OrderStatus>()?;
    Ok(Json(state.order_repo.update_status(id, status).await?))
}
