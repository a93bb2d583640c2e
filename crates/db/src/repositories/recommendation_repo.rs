//! Repository for the `deck_recommendations` table.
//!
//! Reports are immutable once written except for `user_feedback` (last
//! write wins). Serving is gated twice: `expires_at > now()` and
//! `deck_version = decks.version` at read time.

use deckforge_core::error::CoreError;
use deckforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::recommendation::{DeckRecommendation, NewRecommendation, FEEDBACK_VALUES};
use crate::DbError;

/// Column list for `deck_recommendations` queries.
const RECOMMENDATION_COLUMNS: &str = "\
    id, deck_id, deck_version, algorithm_version, identified_gaps, \
    rule_suggestions, llm_model, llm_prompt_tokens, llm_completion_tokens, \
    llm_cost_usd, llm_suggestions, llm_summary, user_feedback, created_at, \
    updated_at, expires_at";

/// The same columns qualified for deck joins.
const QUALIFIED_RECOMMENDATION_COLUMNS: &str = "\
    r.id, r.deck_id, r.deck_version, r.algorithm_version, r.identified_gaps, \
    r.rule_suggestions, r.llm_model, r.llm_prompt_tokens, \
    r.llm_completion_tokens, r.llm_cost_usd, r.llm_suggestions, \
    r.llm_summary, r.user_feedback, r.created_at, r.updated_at, r.expires_at";

/// Default history page size.
const DEFAULT_HISTORY_LIMIT: i64 = 20;

/// Provides persistence for generated recommendations.
pub struct RecommendationRepo;

impl RecommendationRepo {
    /// Persist a freshly generated report. This is its own small
    /// transaction; generation never holds a deck-wide lock.
    pub async fn insert(
        pool: &PgPool,
        new: &NewRecommendation,
    ) -> Result<DeckRecommendation, sqlx::Error> {
        let query = format!(
            "INSERT INTO deck_recommendations \
                (deck_id, deck_version, algorithm_version, identified_gaps, \
                 rule_suggestions, llm_model, llm_prompt_tokens, \
                 llm_completion_tokens, llm_cost_usd, llm_suggestions, \
                 llm_summary, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, \
                     NOW() + make_interval(hours => $12::int)) \
             RETURNING {RECOMMENDATION_COLUMNS}"
        );
        sqlx::query_as::<_, DeckRecommendation>(&query)
            .bind(new.deck_id)
            .bind(new.deck_version)
            .bind(&new.algorithm_version)
            .bind(&new.identified_gaps)
            .bind(&new.rule_suggestions)
            .bind(new.llm_model.as_deref())
            .bind(new.llm_prompt_tokens)
            .bind(new.llm_completion_tokens)
            .bind(new.llm_cost_usd)
            .bind(new.llm_suggestions.as_ref())
            .bind(new.llm_summary.as_deref())
            .bind(new.ttl_hours)
            .fetch_one(pool)
            .await
    }

    /// The servable report for a deck: newest unexpired row matching the
    /// deck's current version. A version mismatch reads exactly like expiry.
    pub async fn find_current(
        pool: &PgPool,
        deck_id: DbId,
        deck_version: i64,
    ) -> Result<Option<DeckRecommendation>, sqlx::Error> {
        let query = format!(
            "SELECT {RECOMMENDATION_COLUMNS} FROM deck_recommendations \
             WHERE deck_id = $1 AND deck_version = $2 AND expires_at > NOW() \
             ORDER BY created_at DESC LIMIT 1"
        );
        sqlx::query_as::<_, DeckRecommendation>(&query)
            .bind(deck_id)
            .bind(deck_version)
            .fetch_optional(pool)
            .await
    }

    /// Past reports for a deck, newest first, expired ones included.
    pub async fn history(
        pool: &PgPool,
        deck_id: DbId,
        limit: Option<i64>,
    ) -> Result<Vec<DeckRecommendation>, sqlx::Error> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, 100);
        let query = format!(
            "SELECT {RECOMMENDATION_COLUMNS} FROM deck_recommendations \
             WHERE deck_id = $1 ORDER BY created_at DESC LIMIT $2"
        );
        sqlx::query_as::<_, DeckRecommendation>(&query)
            .bind(deck_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Record feedback on a report. Last write wins; the report must belong
    /// to one of the user's decks.
    pub async fn record_feedback(
        pool: &PgPool,
        user_id: DbId,
        recommendation_id: DbId,
        feedback: &str,
    ) -> Result<DeckRecommendation, DbError> {
        if !FEEDBACK_VALUES.contains(&feedback) {
            return Err(CoreError::Validation(format!(
                "feedback must be one of {FEEDBACK_VALUES:?}, got '{feedback}'"
            ))
            .into());
        }

        let query = format!(
            "UPDATE deck_recommendations r SET user_feedback = $3 \
             FROM decks d \
             WHERE r.id = $1 AND d.id = r.deck_id AND d.user_id = $2 \
             RETURNING {QUALIFIED_RECOMMENDATION_COLUMNS}"
        );
        sqlx::query_as::<_, DeckRecommendation>(&query)
            .bind(recommendation_id)
            .bind(user_id)
            .bind(feedback)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "Recommendation",
                    id: recommendation_id,
                }
                .into()
            })
    }
}
