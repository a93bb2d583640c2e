//! Handlers for the `/users/{id}/folders` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use deckforge_core::error::CoreError;
use deckforge_core::types::DbId;
use deckforge_db::models::folder::{CreateFolder, UpdateFolder};
use deckforge_db::repositories::FolderRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/{id}/folders
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let folders = FolderRepo::list(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: folders }))
}

/// POST /api/v1/users/{id}/folders
pub async fn create(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<CreateFolder>,
) -> AppResult<impl IntoResponse> {
    let folder = FolderRepo::create(&state.pool, user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: folder })))
}

/// PATCH /api/v1/users/{id}/folders/{fid}
pub async fn update(
    State(state): State<AppState>,
    Path((user_id, folder_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateFolder>,
) -> AppResult<impl IntoResponse> {
    let folder = FolderRepo::update(&state.pool, user_id, folder_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Folder",
            id: folder_id,
        }))?;
    Ok(Json(DataResponse { data: folder }))
}

/// DELETE /api/v1/users/{id}/folders/{fid}
///
/// Entries filed in the folder become unfiled; they are never deleted.
pub async fn delete(
    State(state): State<AppState>,
    Path((user_id, folder_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let deleted = FolderRepo::delete(&state.pool, user_id, folder_id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Folder",
            id: folder_id,
        }))
    }
}
