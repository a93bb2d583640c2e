//! Handlers for the read-only card catalog.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use deckforge_db::models::card::CardSearchParams;
use deckforge_db::repositories::CatalogRepo;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/cards/search?q=&format=&color=&maxPrice=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<CardSearchParams>,
) -> AppResult<impl IntoResponse> {
    let cards = CatalogRepo::search(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: cards }))
}

/// GET /api/v1/cards/{oracle_id}
pub async fn get_by_oracle(
    State(state): State<AppState>,
    Path(oracle_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let card = CatalogRepo::find_card_by_oracle(&state.pool, oracle_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No card with oracle id {oracle_id}")))?;
    Ok(Json(DataResponse { data: card }))
}

/// GET /api/v1/cards/{oracle_id}/prints
pub async fn prints(
    State(state): State<AppState>,
    Path(oracle_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let card = CatalogRepo::find_card_by_oracle(&state.pool, oracle_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No card with oracle id {oracle_id}")))?;
    let prints = CatalogRepo::prints_for_card(&state.pool, card.id).await?;
    Ok(Json(DataResponse { data: prints }))
}
