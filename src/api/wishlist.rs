use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::extract::JsonBody;
use crate::auth::AuthUser;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::Book;
use crate::services::wishlist_service;

#[derive(Deserialize)]
pub struct AddRequest {
    book_id: i32,
}

pub async fn list_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Book>>, DomainError> {
    let books = wishlist_service::list(state.db(), state.book_repo.as_ref(), user.user_id).await?;
    Ok(Json(books))
}

pub async fn add_to_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(request): JsonBody<AddRequest>,
) -> Result<Json<Value>, DomainError> {
    wishlist_service::add(state.db(), user.user_id, request.book_id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(book_id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    wishlist_service::remove(state.db(), user.user_id, book_id).await?;
    Ok(Json(json!({ "success": true })))
}
