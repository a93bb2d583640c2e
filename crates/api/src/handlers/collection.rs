//! Handlers for the `/users/{id}/collection` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use deckforge_core::types::DbId;
use deckforge_db::models::collection::{
    AddToCollection, BulkAddTags, BulkMoveToFolder, CollectionListParams, RemoveFromCollection,
    UpdateCollectionEntry,
};
use deckforge_db::repositories::CollectionRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/users/{id}/collection
///
/// Adding a print that already exists under the same natural key (print,
/// foil, condition) merges quantities into the existing entry.
pub async fn add(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<AddToCollection>,
) -> AppResult<impl IntoResponse> {
    let entry = CollectionRepo::add(&state.pool, user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// GET /api/v1/users/{id}/collection
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<CollectionListParams>,
) -> AppResult<impl IntoResponse> {
    let entries = CollectionRepo::list(&state.pool, user_id, &params).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/users/{id}/collection/stats
pub async fn stats(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let stats = CollectionRepo::stats(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// PATCH /api/v1/users/{id}/collection/{entry_id}
pub async fn update(
    State(state): State<AppState>,
    Path((user_id, entry_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCollectionEntry>,
) -> AppResult<impl IntoResponse> {
    let entry = CollectionRepo::update(&state.pool, user_id, entry_id, &input).await?;
    Ok(Json(DataResponse { data: entry }))
}

/// DELETE /api/v1/users/{id}/collection/{entry_id}
///
/// The body carries the quantity to remove. Removing at least the owned
/// quantity deletes the entry; the response data is then `null`.
pub async fn remove(
    State(state): State<AppState>,
    Path((user_id, entry_id)): Path<(DbId, DbId)>,
    Json(input): Json<RemoveFromCollection>,
) -> AppResult<impl IntoResponse> {
    let remaining = CollectionRepo::remove(&state.pool, user_id, entry_id, &input).await?;
    Ok(Json(DataResponse { data: remaining }))
}

/// Result shape for the bulk folder move.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMoveResult {
    pub moved: u64,
}

/// POST /api/v1/users/{id}/collection/bulk/move
///
/// All-or-nothing: an unresolved entry id rejects the whole request.
pub async fn bulk_move(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<BulkMoveToFolder>,
) -> AppResult<impl IntoResponse> {
    let moved = CollectionRepo::bulk_move_to_folder(&state.pool, user_id, &input).await?;
    Ok(Json(DataResponse {
        data: BulkMoveResult { moved },
    }))
}

/// POST /api/v1/users/{id}/collection/bulk/tags
///
/// All-or-nothing: an unresolved entry or tag id rejects the whole request.
pub async fn bulk_tags(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<BulkAddTags>,
) -> AppResult<StatusCode> {
    CollectionRepo::bulk_add_tags(&state.pool, user_id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}
