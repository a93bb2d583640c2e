//! Handlers for deck recommendations.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use deckforge_core::error::CoreError;
use deckforge_core::types::DbId;
use deckforge_db::models::recommendation::{RecommendationFeedback, RequestRecommendation};
use deckforge_db::repositories::{DeckRepo, RecommendationRepo};

use crate::engine::recommend;
use crate::error::{AppError, AppResult};
use crate::middleware::ident::CurrentUser;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/recommendations
///
/// Serves the cached report when one is current; otherwise generates a
/// fresh one. Refinement failures degrade to a rule-only report and never
/// fail the request.
pub async fn request(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(input): Json<RequestRecommendation>,
) -> AppResult<impl IntoResponse> {
    let report = recommend::generate(&state, user.user_id, &input).await?;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/decks/{deck_id}/recommendations/current
///
/// An expired report, or one computed against an older deck version, is
/// regenerated with default options.
pub async fn current(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let input = RequestRecommendation::for_deck(deck_id);
    let report = recommend::generate(&state, user.user_id, &input).await?;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/decks/{deck_id}/recommendations
///
/// History summaries, newest first, expired reports included.
pub async fn history(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
    Query(params): Query<LimitParams>,
) -> AppResult<impl IntoResponse> {
    DeckRepo::find_by_id(&state.pool, user.user_id, deck_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Deck",
            id: deck_id,
        }))?;

    let reports = RecommendationRepo::history(&state.pool, deck_id, params.limit).await?;
    let summaries: Vec<_> = reports.iter().map(|r| r.summarize()).collect();
    Ok(Json(DataResponse { data: summaries }))
}

/// POST /api/v1/recommendations/{id}/feedback
///
/// Single mutable field; last write wins.
pub async fn feedback(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(recommendation_id): Path<DbId>,
    Json(input): Json<RecommendationFeedback>,
) -> AppResult<impl IntoResponse> {
    let report = RecommendationRepo::record_feedback(
        &state.pool,
        user.user_id,
        recommendation_id,
        &input.feedback,
    )
    .await?;
    Ok(Json(DataResponse { data: report }))
}
