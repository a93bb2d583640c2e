//! Handlers for deck CRUD and cloning.
//!
//! Listing and creation are user-scoped by path; everything addressing one
//! deck reads the caller from [`CurrentUser`] and the repositories enforce
//! ownership.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use deckforge_core::error::CoreError;
use deckforge_core::types::DbId;
use deckforge_db::models::deck::{CloneDeck, CreateDeck, DeckListParams, UpdateDeck};
use deckforge_db::repositories::{DeckCardRepo, DeckRepo, OwnershipRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::ident::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/{id}/decks
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<DeckListParams>,
) -> AppResult<impl IntoResponse> {
    let decks = DeckRepo::list(&state.pool, user_id, &params).await?;
    Ok(Json(DataResponse { data: decks }))
}

/// POST /api/v1/users/{id}/decks
///
/// Creation instantiates the format's section templates.
pub async fn create(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<CreateDeck>,
) -> AppResult<impl IntoResponse> {
    let deck = DeckRepo::create(&state.pool, user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: deck })))
}

/// GET /api/v1/decks/{deck_id}
pub async fn get_by_id(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deck = DeckRepo::find_by_id(&state.pool, user.user_id, deck_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Deck",
            id: deck_id,
        }))?;
    Ok(Json(DataResponse { data: deck }))
}

/// PATCH /api/v1/decks/{deck_id}
///
/// Metadata only; composition is untouched, so the deck version does not
/// change.
pub async fn update(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
    Json(input): Json<UpdateDeck>,
) -> AppResult<impl IntoResponse> {
    let deck = DeckRepo::update(&state.pool, user.user_id, deck_id, &input).await?;
    Ok(Json(DataResponse { data: deck }))
}

/// DELETE /api/v1/decks/{deck_id}
pub async fn delete(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = DeckRepo::delete(&state.pool, user.user_id, deck_id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Deck",
            id: deck_id,
        }))
    }
}

/// POST /api/v1/decks/{deck_id}/clone
///
/// The copy starts private at version 1 regardless of the source.
pub async fn clone(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
    Json(input): Json<CloneDeck>,
) -> AppResult<impl IntoResponse> {
    let deck = DeckRepo::clone(&state.pool, user.user_id, deck_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: deck })))
}

/// GET /api/v1/decks/{deck_id}/stats
///
/// Aggregates over the live composition; availability excludes this deck's
/// own usage so a fully owned deck reads as owned.
pub async fn stats(
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

    let details = DeckCardRepo::list_for_deck(&state.pool, deck_id).await?;
    let resolved: Vec<_> = details.iter().map(|d| d.to_resolved()).collect();
    let ledger = OwnershipRepo::build_ledger(&state.pool, user.user_id, Some(deck_id)).await?;
    let stats = deckforge_core::stats::aggregate(&resolved, &ledger.availability());

    Ok(Json(DataResponse { data: stats }))
}
