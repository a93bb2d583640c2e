//! Deck recommendation models.

use deckforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `deck_recommendations` table. The gaps and suggestions are
/// stored as JSON exactly as produced at generation time; `deck_version`
/// pins the report to the deck state it was computed against.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckRecommendation {
    pub id: DbId,
    pub deck_id: DbId,
    pub deck_version: i64,
    pub algorithm_version: String,
    pub identified_gaps: serde_json::Value,
    pub rule_suggestions: serde_json::Value,
    pub llm_model: Option<String>,
    pub llm_prompt_tokens: Option<i32>,
    pub llm_completion_tokens: Option<i32>,
    pub llm_cost_usd: Option<f64>,
    pub llm_suggestions: Option<serde_json::Value>,
    pub llm_summary: Option<String>,
    pub user_feedback: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub expires_at: Timestamp,
}

/// Insert shape for a freshly generated recommendation.
#[derive(Debug, Clone)]
pub struct NewRecommendation {
    pub deck_id: DbId,
    pub deck_version: i64,
    pub algorithm_version: String,
    pub identified_gaps: serde_json::Value,
    pub rule_suggestions: serde_json::Value,
    pub llm_model: Option<String>,
    pub llm_prompt_tokens: Option<i32>,
    pub llm_completion_tokens: Option<i32>,
    pub llm_cost_usd: Option<f64>,
    pub llm_suggestions: Option<serde_json::Value>,
    pub llm_summary: Option<String>,
    /// Hours until the report stops being served from cache.
    pub ttl_hours: i64,
}

/// Summary shape for recommendation history listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSummary {
    pub id: DbId,
    pub deck_id: DbId,
    pub algorithm_version: String,
    pub suggestion_count: usize,
    pub gap_count: usize,
    pub user_feedback: Option<String>,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl DeckRecommendation {
    /// Whether the language-model refinement stage ran for this report.
    pub fn llm_refined(&self) -> bool {
        self.llm_suggestions.is_some()
    }

    /// Collapse a report into its history summary.
    pub fn summarize(&self) -> RecommendationSummary {
        let count = |v: &serde_json::Value| v.as_array().map(Vec::len).unwrap_or(0);
        RecommendationSummary {
            id: self.id,
            deck_id: self.deck_id,
            algorithm_version: self.algorithm_version.clone(),
            suggestion_count: self
                .llm_suggestions
                .as_ref()
                .map(|v| count(v))
                .unwrap_or_else(|| count(&self.rule_suggestions)),
            gap_count: count(&self.identified_gaps),
            user_feedback: self.user_feedback.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

/// Request body for generating recommendations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecommendation {
    pub deck_id: DbId,
    #[serde(default = "default_true")]
    pub use_llm: bool,
    #[serde(default = "default_true")]
    pub consider_collection: bool,
    /// Price ceiling per suggested card, in USD. Only the display price on
    /// suggestions follows the user's currency preference.
    pub max_price_per_card: Option<f64>,
    /// Skip the cache and regenerate even when a current report exists.
    #[serde(default)]
    pub force_refresh: bool,
}

impl RequestRecommendation {
    /// Default options for a deck, as used when serving `GET .../current`.
    pub fn for_deck(deck_id: DbId) -> Self {
        Self {
            deck_id,
            use_llm: true,
            consider_collection: true,
            max_price_per_card: None,
            force_refresh: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Request body for recording feedback on a recommendation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationFeedback {
    pub feedback: String,
}

/// Allowed feedback values.
pub const FEEDBACK_VALUES: &[&str] = &["helpful", "not_helpful"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_use_llm_and_collection() {
        let req: RequestRecommendation = serde_json::from_str(r#"{"deckId": 3}"#).unwrap();
        assert_eq!(req.deck_id, 3);
        assert!(req.use_llm);
        assert!(req.consider_collection);
        assert!(!req.force_refresh);
        assert_eq!(req.max_price_per_card, None);
    }

    #[test]
    fn request_accepts_overrides() {
        let req: RequestRecommendation = serde_json::from_str(
            r#"{"deckId": 3, "useLlm": false, "maxPricePerCard": 5.5, "forceRefresh": true}"#,
        )
        .unwrap();
        assert!(!req.use_llm);
        assert_eq!(req.max_price_per_card, Some(5.5));
        assert!(req.force_refresh);
    }
}
