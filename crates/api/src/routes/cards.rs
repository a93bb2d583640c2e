//! Route definitions for the read-only card catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::cards;
use crate::state::AppState;

/// ```text
/// GET /cards/search              -> search
/// GET /cards/{oracle_id}         -> get_by_oracle
/// GET /cards/{oracle_id}/prints  -> prints
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cards/search", get(cards::search))
        .route("/cards/{oracle_id}", get(cards::get_by_oracle))
        .route("/cards/{oracle_id}/prints", get(cards::prints))
}
