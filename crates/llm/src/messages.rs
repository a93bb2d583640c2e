//! Wire types for the refinement service contract.

use deckforge_core::gaps::DeckGap;
use deckforge_core::recommend::{CardSummary, RuleSuggestion};
use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/refine`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineRequest {
    /// Model the service should use.
    pub model: String,
    pub deck_name: String,
    pub format: String,
    /// Compact digest of the deck's statistics (curve, colors, types).
    pub deck_summary: serde_json::Value,
    pub identified_gaps: Vec<DeckGap>,
    pub rule_suggestions: Vec<RuleSuggestion>,
}

/// One suggestion refined by the service: the rule-based suggestion plus
/// strategic reasoning and optional cut proposals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinedSuggestion {
    #[serde(flatten)]
    pub suggestion: RuleSuggestion,
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_cuts: Option<Vec<CardSummary>>,
}

/// Response body from `POST /v1/refine`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineResponse {
    pub suggestions: Vec<RefinedSuggestion>,
    /// Strategic summary of the deck.
    pub summary: String,
    /// Model that actually served the request.
    pub model: String,
    pub prompt_tokens: Option<i32>,
    pub completion_tokens: Option<i32>,
    pub cost_usd: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parses_full_payload() {
        let body = serde_json::json!({
            "suggestions": [{
                "card": {
                    "oracleId": "5989e52d-b1e5-4dbc-9a55-f78f5a0d697e",
                    "name": "Cultivate",
                    "manaCost": "{2}{G}",
                    "typeLine": "Sorcery",
                    "colors": ["G"],
                    "cmc": 3.0
                },
                "reason": "addresses ramp gap",
                "priority": "high",
                "addressesGap": "ramp",
                "ownership": {
                    "isOwned": true,
                    "ownedQuantity": 2,
                    "usedInDecks": 0,
                    "availableQuantity": 2
                },
                "price": "$0.50",
                "reasoning": "Smooths the curve into your five-drops.",
                "suggestedCuts": []
            }],
            "summary": "A midrange deck that wants more early ramp.",
            "model": "refine-2",
            "promptTokens": 812,
            "completionTokens": 214,
            "costUsd": 0.0031
        });

        let parsed: RefineResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.suggestions.len(), 1);
        let refined = &parsed.suggestions[0];
        assert_eq!(refined.suggestion.card.name, "Cultivate");
        assert_eq!(refined.reasoning, "Smooths the curve into your five-drops.");
        assert_eq!(parsed.prompt_tokens, Some(812));
        assert_eq!(parsed.model, "refine-2");
    }

    #[test]
    fn response_parses_without_token_accounting() {
        let body = serde_json::json!({
            "suggestions": [],
            "summary": "No changes suggested.",
            "model": "refine-2"
        });
        let parsed: RefineResponse = serde_json::from_value(body).unwrap();
        assert!(parsed.suggestions.is_empty());
        assert_eq!(parsed.cost_usd, None);
    }
}
