use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use deckforge_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `deckforge_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A missing resource that is not addressed by a numeric id (catalog
    /// lookups key on oracle UUIDs).
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<deckforge_db::DbError> for AppError {
    fn from(err: deckforge_db::DbError) -> Self {
        match err {
            deckforge_db::DbError::Sqlx(e) => AppError::Database(e),
            deckforge_db::DbError::Core(e) => AppError::Core(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                    None,
                ),
                CoreError::Validation(msg) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                    None,
                ),
                CoreError::Conflict(msg) => {
                    (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None)
                }
                CoreError::RuleViolation(violation) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "RULE_VIOLATION",
                    violation.to_string(),
                    Some(json!({
                        "rule": violation.rule,
                        "limit": violation.limit,
                        "attempted": violation.attempted,
                    })),
                ),
                CoreError::PartialFailure { entity, failed_ids } => (
                    StatusCode::NOT_FOUND,
                    "PARTIAL_FAILURE",
                    format!("{entity} ids not found; nothing was changed"),
                    Some(json!({ "failedIds": failed_ids })),
                ),
                CoreError::InconsistentState(msg) => {
                    tracing::error!(error = %msg, "Inconsistent state detected");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INCONSISTENT_STATE",
                        "An internal consistency error occurred".to_string(),
                        None,
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => {
                let (status, code, message) = classify_sqlx_error(err);
                (status, code, message, None)
            }

            // --- HTTP-specific errors ---
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None)
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckforge_core::composition::CompositionViolation;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, body) = response_parts(AppError::Core(CoreError::NotFound {
            entity: "Deck",
            id: 42,
        }))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["error"], "Deck with id 42 not found");
    }

    #[tokio::test]
    async fn rule_violation_maps_to_422_with_details() {
        let violation = CompositionViolation {
            rule: "maxCards",
            limit: Some(2),
            attempted: Some(3),
            detail: "section holds at most 2 cards, mutation would make 3".to_string(),
        };
        let (status, body) =
            response_parts(AppError::Core(CoreError::RuleViolation(violation))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "RULE_VIOLATION");
        assert_eq!(body["details"]["rule"], "maxCards");
        assert_eq!(body["details"]["limit"], 2);
        assert_eq!(body["details"]["attempted"], 3);
    }

    #[tokio::test]
    async fn partial_failure_enumerates_ids() {
        let (status, body) = response_parts(AppError::Core(CoreError::PartialFailure {
            entity: "CollectionEntry",
            failed_ids: vec![7, 9],
        }))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "PARTIAL_FAILURE");
        assert_eq!(body["details"]["failedIds"], serde_json::json!([7, 9]));
    }

    #[tokio::test]
    async fn inconsistent_state_hides_detail() {
        let (status, body) = response_parts(AppError::Core(CoreError::InconsistentState(
            "print 3 has 1 owned but 2 used in decks".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "INCONSISTENT_STATE");
        let message = body["error"].as_str().unwrap();
        assert!(!message.contains("print 3"));
    }

    #[tokio::test]
    async fn validation_maps_to_400() {
        let (status, body) = response_parts(AppError::Core(CoreError::Validation(
            "quantity must be at least 1".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn conflict_maps_to_409() {
        let (status, body) = response_parts(AppError::Core(CoreError::Conflict(
            "username already taken".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn row_not_found_maps_to_404() {
        let (status, body) = response_parts(AppError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
