//! Caller identity extractor for Axum handlers.
//!
//! Identity provisioning (login, sessions) lives outside this service; the
//! gateway in front of it resolves the session and forwards the user's id in
//! the `x-user-id` header. Routes whose path does not carry the user id
//! (`/decks/{id}`, `/deck-cards/{id}`, `/recommendations`, ...) read it from
//! this extractor instead.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use deckforge_core::error::CoreError;
use deckforge_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the resolved user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user a request acts on behalf of.
///
/// ```ignore
/// async fn my_handler(user: CurrentUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!(
                    "Missing {USER_ID_HEADER} header"
                )))
            })?;

        let user_id = parse_user_id(raw).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Invalid {USER_ID_HEADER} header: '{raw}'"
            )))
        })?;

        Ok(CurrentUser { user_id })
    }
}

fn parse_user_id(raw: &str) -> Option<DbId> {
    raw.trim().parse::<DbId>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ids_only() {
        assert_eq!(parse_user_id("42"), Some(42));
        assert_eq!(parse_user_id(" 7 "), Some(7));
        assert_eq!(parse_user_id("0"), None);
        assert_eq!(parse_user_id("-3"), None);
        assert_eq!(parse_user_id("abc"), None);
    }
}
