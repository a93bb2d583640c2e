//! Handlers for the `/users/{id}` resource and its preferences.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use deckforge_core::error::CoreError;
use deckforge_core::types::DbId;
use deckforge_db::models::user::{UpdatePreferences, UpdateUser};
use deckforge_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(DataResponse { data: user }))
}

/// PATCH /api/v1/users/{id}
///
/// A username collision surfaces as 409 via the `uq_users_username`
/// constraint.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(DataResponse { data: user }))
}

/// GET /api/v1/users/{id}/preferences
///
/// Creates the default preference row on first access.
pub async fn get_preferences(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let preferences = UserRepo::get_or_init_preferences(&state.pool, id).await?;
    Ok(Json(DataResponse { data: preferences }))
}

/// PATCH /api/v1/users/{id}/preferences
///
/// Scalar fields replace; the nested view and notification configs are
/// typed partial patches merged into the stored objects.
pub async fn update_preferences(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePreferences>,
) -> AppResult<impl IntoResponse> {
    let preferences = UserRepo::update_preferences(&state.pool, id, &input).await?;
    Ok(Json(DataResponse { data: preferences }))
}
