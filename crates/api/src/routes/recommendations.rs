//! Route definitions for deck recommendations.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::recommendations;
use crate::state::AppState;

/// ```text
/// POST /recommendations                          -> request
/// POST /recommendations/{id}/feedback            -> feedback
/// GET  /decks/{deck_id}/recommendations          -> history
/// GET  /decks/{deck_id}/recommendations/current  -> current
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recommendations", post(recommendations::request))
        .route(
            "/recommendations/{id}/feedback",
            post(recommendations::feedback),
        )
        .route(
            "/decks/{deck_id}/recommendations",
            get(recommendations::history),
        )
        .route(
            "/decks/{deck_id}/recommendations/current",
            get(recommendations::current),
        )
}
