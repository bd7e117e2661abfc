use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

use crate::api::extract::JsonBody;
use crate::auth::{
    AuthUser, clear_session_cookie, hash_password, session_cookie, start_session, verify_password,
};
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::{UserDto, timestamp, user};
use crate::services::profile_service;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Deserialize)]
pub struct RegisterRequest {
    email: String,
    password: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    city: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Session cookie plus the user and token in the body.
async fn signed_in(
    state: &AppState,
    user: user::Model,
    status: StatusCode,
) -> Result<Response, DomainError> {
    let (_, token) = start_session(state, &user).await?;
    let cookie = session_cookie(
        &token,
        state.config.session_ttl,
        state.config.cookie_secure,
    );

    Ok((
        status,
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "user": UserDto::from(user),
            "token": token
        })),
    )
        .into_response())
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<Response, DomainError> {
    let email = normalize_email(&payload.email);
    if !email.contains('@') {
        return Err(DomainError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let taken = user::Entity::find()
        .filter(user::Column::Email.eq(email.clone()))
        .one(state.db())
        .await?
        .is_some();
    if taken {
        return Err(DomainError::Validation(
            "Email is already registered".to_string(),
        ));
    }

    let now = timestamp();
    let created = user::ActiveModel {
        email: Set(email),
        password_hash: Set(hash_password(&payload.password)?),
        name: Set(optional(payload.name)),
        phone: Set(optional(payload.phone)),
        address: Set(optional(payload.address)),
        city: Set(optional(payload.city)),
        role: Set(user::ROLE_CUSTOMER.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(state.db())
    .await?;

    tracing::info!("Registered user {}", created.id);
    signed_in(&state, created, StatusCode::CREATED).await
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Response, DomainError> {
    let email = normalize_email(&payload.email);
    tracing::info!("Login attempt for {}", email);

    let invalid = || DomainError::Unauthorized("Invalid email or password".to_string());

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(email.clone()))
        .one(state.db())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        tracing::warn!("Password verification failed for {}", email);
        return Err(invalid());
    }

    signed_in(&state, user, StatusCode::OK).await
}

/// Ends the current session, if any, and clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> Result<impl IntoResponse, DomainError> {
    if let Some(user) = user {
        state.session_repo.revoke(&user.session_id).await?;
        tracing::info!("User {} logged out", user.user_id);
    }

    Ok((
        [(
            header::SET_COOKIE,
            clear_session_cookie(state.config.cookie_secure),
        )],
        Json(json!({ "success": true })),
    ))
}

pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserDto>, DomainError> {
    Ok(Json(
        profile_service::get_profile(state.db(), user.user_id).await?,
    ))
}
