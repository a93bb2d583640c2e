//! Route definitions for user profiles and preferences.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// ```text
/// GET/PATCH /users/{id}              -> get_user / update_user
/// GET/PATCH /users/{id}/preferences  -> get_preferences / update_preferences
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{id}", get(users::get_user).patch(users::update_user))
        .route(
            "/users/{id}/preferences",
            get(users::get_preferences).patch(users::update_preferences),
        )
}
