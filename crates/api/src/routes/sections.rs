//! Route definitions for deck sections.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::sections;
use crate::state::AppState;

/// ```text
/// GET/POST     /decks/{deck_id}/sections          -> list / create
/// POST         /decks/{deck_id}/sections/reorder  -> reorder
/// PATCH/DELETE /sections/{sid}                    -> update / delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/decks/{deck_id}/sections",
            get(sections::list).post(sections::create),
        )
        .route(
            "/decks/{deck_id}/sections/reorder",
            post(sections::reorder),
        )
        .route(
            "/sections/{sid}",
            patch(sections::update).delete(sections::delete),
        )
}
