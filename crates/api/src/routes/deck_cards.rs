//! Route definitions for cards inside decks.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::deck_cards;
use crate::state::AppState;

/// ```text
/// GET/POST     /decks/{deck_id}/cards         -> list / add
/// POST         /decks/{deck_id}/cards/bulk    -> bulk_add
/// PATCH/DELETE /deck-cards/{id}               -> update / remove
/// POST         /deck-cards/{id}/move          -> move_card
/// POST         /sections/{sid}/cards/reorder  -> reorder
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/decks/{deck_id}/cards",
            get(deck_cards::list).post(deck_cards::add),
        )
        .route("/decks/{deck_id}/cards/bulk", post(deck_cards::bulk_add))
        .route(
            "/deck-cards/{id}",
            patch(deck_cards::update).delete(deck_cards::remove),
        )
        .route("/deck-cards/{id}/move", post(deck_cards::move_card))
        .route(
            "/sections/{sid}/cards/reorder",
            post(deck_cards::reorder),
        )
}
