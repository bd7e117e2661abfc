use axum::{Json, extract::State};

use crate::api::extract::JsonBody;
use crate::auth::AuthUser;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::UserDto;
use crate::services::profile_service::{self, ProfileUpdate};

pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserDto>, DomainError> {
    Ok(Json(
        profile_service::get_profile(state.db(), user.user_id).await?,
    ))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> Result<Json<UserDto>, DomainError> {
    Ok(Json(
        profile_service::update_profile(state.db(), user.user_id, update).await?,
    ))
}
