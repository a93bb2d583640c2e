//! Route definitions for collection entries and bulk operations.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::collection;
use crate::state::AppState;

/// ```text
/// GET/POST     /users/{id}/collection              -> list / add
/// GET          /users/{id}/collection/stats        -> stats
/// PATCH/DELETE /users/{id}/collection/{entry_id}   -> update / remove
/// POST         /users/{id}/collection/bulk/move    -> bulk_move
/// POST         /users/{id}/collection/bulk/tags    -> bulk_tags
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{id}/collection",
            get(collection::list).post(collection::add),
        )
        .route("/users/{id}/collection/stats", get(collection::stats))
        .route(
            "/users/{id}/collection/bulk/move",
            post(collection::bulk_move),
        )
        .route(
            "/users/{id}/collection/bulk/tags",
            post(collection::bulk_tags),
        )
        .route(
            "/users/{id}/collection/{entry_id}",
            axum::routing::patch(collection::update).delete(collection::remove),
        )
}
