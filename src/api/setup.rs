use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::db;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::seed;

/// Creates missing tables, the default settings and the configured admin.
/// Running it again changes nothing.
#[utoipa::path(
    post,
    path = "/api/setup",
    responses(
        (status = 200, description = "Schema and defaults are in place")
    )
)]
pub async fn setup(State(state): State<AppState>) -> Result<Json<Value>, DomainError> {
    db::run_migrations(state.db()).await?;
    seed::ensure_defaults(
        state.db(),
        state.settings_repo.as_ref(),
        state.config.admin.as_ref(),
    )
    .await?;

    tracing::info!("Setup completed");
    Ok(Json(json!({
        "success": true,
        "message": "Database is ready"
    })))
}
