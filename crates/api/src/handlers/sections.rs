//! Handlers for deck sections.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use deckforge_core::error::CoreError;
use deckforge_core::types::DbId;
use deckforge_db::models::deck::{CreateSection, ReorderSections, UpdateSection};
use deckforge_db::repositories::DeckRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::ident::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/decks/{deck_id}/sections
pub async fn list(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    DeckRepo::find_by_id(&state.pool, user.user_id, deck_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Deck",
            id: deck_id,
        }))?;
    let sections = DeckRepo::list_sections(&state.pool, deck_id).await?;
    Ok(Json(DataResponse { data: sections }))
}

/// POST /api/v1/decks/{deck_id}/sections
pub async fn create(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
    Json(input): Json<CreateSection>,
) -> AppResult<impl IntoResponse> {
    let section = DeckRepo::create_section(&state.pool, user.user_id, deck_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: section })))
}

/// PATCH /api/v1/sections/{sid}
///
/// A validation-rule change bumps the deck version; renames do not.
pub async fn update(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(section_id): Path<DbId>,
    Json(input): Json<UpdateSection>,
) -> AppResult<impl IntoResponse> {
    let section = DeckRepo::update_section(&state.pool, user.user_id, section_id, &input).await?;
    Ok(Json(DataResponse { data: section }))
}

/// DELETE /api/v1/sections/{sid}
///
/// Cards in the section cascade, so the deck version bumps.
pub async fn delete(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(section_id): Path<DbId>,
) -> AppResult<StatusCode> {
    DeckRepo::delete_section(&state.pool, user.user_id, section_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/decks/{deck_id}/sections/reorder
///
/// The ids must be exactly the current membership; the operation is
/// idempotent and does not bump the deck version.
pub async fn reorder(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
    Json(input): Json<ReorderSections>,
) -> AppResult<impl IntoResponse> {
    let sections = DeckRepo::reorder_sections(&state.pool, user.user_id, deck_id, &input).await?;
    Ok(Json(DataResponse { data: sections }))
}
