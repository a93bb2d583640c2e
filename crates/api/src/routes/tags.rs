//! Route definitions for user tags.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::tags;
use crate::state::AppState;

/// ```text
/// GET/POST     /users/{id}/tags           -> list / create
/// PATCH/DELETE /users/{id}/tags/{tag_id}  -> update / delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{id}/tags", get(tags::list).post(tags::create))
        .route(
            "/users/{id}/tags/{tag_id}",
            patch(tags::update).delete(tags::delete),
        )
}
