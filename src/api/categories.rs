use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::api::extract::JsonBody;
use crate::auth::AdminUser;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::category::{CategoryInput, Model as Category};

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, DomainError> {
    Ok(Json(state.category_repo.find_all().await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Category>, DomainError> {
    state
        .category_repo
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| DomainError::not_found("Category"))
}

pub async fn create_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(input): JsonBody<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), DomainError> {
    let category = state.category_repo.create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    JsonBody(input): JsonBody<CategoryInput>,
) -> Result<Json<Category>, DomainError> {
    Ok(Json(state.category_repo.update(id, input).await?))
}

pub async fn delete_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    state.category_repo.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}
