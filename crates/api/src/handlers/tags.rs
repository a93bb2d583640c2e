//! Handlers for the `/users/{id}/tags` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use deckforge_core::error::CoreError;
use deckforge_core::types::DbId;
use deckforge_db::models::tag::{CreateTag, UpdateTag};
use deckforge_db::repositories::TagRepo;

use crate::error::{AppError, AppResult};
use crate::query::TagTypeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/{id}/tags
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<TagTypeParams>,
) -> AppResult<impl IntoResponse> {
    let tags = TagRepo::list(&state.pool, user_id, params.tag_type.as_deref()).await?;
    Ok(Json(DataResponse { data: tags }))
}

/// POST /api/v1/users/{id}/tags
pub async fn create(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<CreateTag>,
) -> AppResult<impl IntoResponse> {
    let tag = TagRepo::create(&state.pool, user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: tag })))
}

/// PATCH /api/v1/users/{id}/tags/{tag_id}
///
/// The tag type is immutable after creation; the DTO does not carry it.
pub async fn update(
    State(state): State<AppState>,
    Path((user_id, tag_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateTag>,
) -> AppResult<impl IntoResponse> {
    let tag = TagRepo::update(&state.pool, user_id, tag_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Tag",
            id: tag_id,
        }))?;
    Ok(Json(DataResponse { data: tag }))
}

/// DELETE /api/v1/users/{id}/tags/{tag_id}
///
/// Associations cascade; tagged entries and decks are untouched.
pub async fn delete(
    State(state): State<AppState>,
    Path((user_id, tag_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let deleted = TagRepo::delete(&state.pool, user_id, tag_id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Tag",
            id: tag_id,
        }))
    }
}
