//! Content slots and settings: public reads, admin writes, any JSON value.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::api::extract::JsonBody;
use crate::auth::AdminUser;
use crate::domain::{DomainError, KeyValueRepository};
use crate::infrastructure::AppState;

async fn read(store: &dyn KeyValueRepository, key: &str, what: &str) -> Result<Json<Value>, DomainError> {
    let value = store
        .get(key)
        .await?
        .ok_or_else(|| DomainError::not_found(what))?;
    Ok(Json(json!({ "key": key, "value": value })))
}

async fn write(
    store: &dyn KeyValueRepository,
    key: &str,
    value: Value,
) -> Result<Json<Value>, DomainError> {
    store.set(key, value.clone()).await?;
    Ok(Json(json!({ "key": key, "value": value })))
}

pub async fn get_content(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, DomainError> {
    read(state.content_repo.as_ref(), &key, "Content").await
}

pub async fn set_content(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(key): Path<String>,
    JsonBody(value): JsonBody<Value>,
) -> Result<Json<Value>, DomainError> {
    write(state.content_repo.as_ref(), &key, value).await
}

pub async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, DomainError> {
    read(state.settings_repo.as_ref(), &key, "Setting").await
}

pub async fn set_setting(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(key): Path<String>,
    JsonBody(value): JsonBody<Value>,
) -> Result<Json<Value>, DomainError> {
    write(state.settings_repo.as_ref(), &key, value).await
}
