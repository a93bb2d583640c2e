//! Handlers for cards inside decks.
//!
//! Every mutation here runs the propose/validate/commit pipeline in
//! `DeckCardRepo`: the deck row is locked, the hypothetical post-mutation
//! section is validated against its rules, and only then is anything
//! written.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use deckforge_core::error::CoreError;
use deckforge_core::types::DbId;
use deckforge_db::models::deck::{
    AddDeckCard, BulkAddDeckCards, MoveDeckCard, ReorderDeckCards, UpdateDeckCard,
};
use deckforge_db::repositories::{DeckCardRepo, DeckRepo, OwnershipRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::ident::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/decks/{deck_id}/cards
///
/// Cards ordered by section then position, each carrying the caller's
/// ownership figures for its print.
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

    let details = DeckCardRepo::list_for_deck(&state.pool, deck_id).await?;
    let ledger = OwnershipRepo::build_ledger(&state.pool, user.user_id, Some(deck_id)).await?;

    let views: Vec<_> = details
        .into_iter()
        .map(|d| {
            let ownership = ledger.get(d.card_print_id).into();
            d.into_view(ownership)
        })
        .collect();

    Ok(Json(DataResponse { data: views }))
}

/// POST /api/v1/decks/{deck_id}/cards
pub async fn add(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
    Json(input): Json<AddDeckCard>,
) -> AppResult<impl IntoResponse> {
    let card = DeckCardRepo::add(&state.pool, user.user_id, deck_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: card })))
}

/// POST /api/v1/decks/{deck_id}/cards/bulk
///
/// All-or-nothing: the first rule rejection rolls the whole batch back.
pub async fn bulk_add(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
    Json(input): Json<BulkAddDeckCards>,
) -> AppResult<impl IntoResponse> {
    let cards = DeckCardRepo::bulk_add(&state.pool, user.user_id, deck_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: cards })))
}

/// PATCH /api/v1/deck-cards/{id}
pub async fn update(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(card_id): Path<DbId>,
    Json(input): Json<UpdateDeckCard>,
) -> AppResult<impl IntoResponse> {
    let card = DeckCardRepo::update(&state.pool, user.user_id, card_id, &input).await?;
    Ok(Json(DataResponse { data: card }))
}

/// DELETE /api/v1/deck-cards/{id}
pub async fn remove(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(card_id): Path<DbId>,
) -> AppResult<StatusCode> {
    DeckCardRepo::remove(&state.pool, user.user_id, card_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/deck-cards/{id}/move
///
/// The full validation pipeline runs against the target section; a
/// same-print row there absorbs the moved quantity.
pub async fn move_card(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(card_id): Path<DbId>,
    Json(input): Json<MoveDeckCard>,
) -> AppResult<impl IntoResponse> {
    let card = DeckCardRepo::move_card(&state.pool, user.user_id, card_id, &input).await?;
    Ok(Json(DataResponse { data: card }))
}

/// POST /api/v1/sections/{sid}/cards/reorder
pub async fn reorder(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(section_id): Path<DbId>,
    Json(input): Json<ReorderDeckCards>,
) -> AppResult<impl IntoResponse> {
    let cards = DeckCardRepo::reorder(&state.pool, user.user_id, section_id, &input).await?;
    Ok(Json(DataResponse { data: cards }))
}
