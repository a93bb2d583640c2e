//! Route definitions for decks.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::decks;
use crate::state::AppState;

/// ```text
/// GET/POST         /users/{id}/decks  -> list / create
/// GET/PATCH/DELETE /decks/{deck_id}   -> get_by_id / update / delete
/// POST             /decks/{deck_id}/clone
/// GET              /decks/{deck_id}/stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{id}/decks", get(decks::list).post(decks::create))
        .route(
            "/decks/{deck_id}",
            get(decks::get_by_id)
                .patch(decks::update)
                .delete(decks::delete),
        )
        .route("/decks/{deck_id}/clone", post(decks::clone))
        .route("/decks/{deck_id}/stats", get(decks::stats))
}
