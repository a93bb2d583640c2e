//! Route definitions for collection folders.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::folders;
use crate::state::AppState;

/// ```text
/// GET/POST     /users/{id}/folders        -> list / create
/// PATCH/DELETE /users/{id}/folders/{fid}  -> update / delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{id}/folders",
            get(folders::list).post(folders::create),
        )
        .route(
            "/users/{id}/folders/{fid}",
            patch(folders::update).delete(folders::delete),
        )
}
