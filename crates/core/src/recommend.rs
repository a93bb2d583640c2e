//! Suggestion ranking: the pure half of the recommendation synthesizer.
//!
//! Candidate lookup and persistence live in the database layer; this module
//! owns the priority matrix and the deterministic ordering of the final
//! suggestion list.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::card::Color;
use crate::gaps::{GapCategory, GapSeverity};
use crate::ownership::CardOwnership;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Rules-identity summary attached to every suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    pub oracle_id: Uuid,
    pub name: String,
    pub mana_cost: Option<String>,
    pub type_line: String,
    pub colors: Vec<Color>,
    pub cmc: f64,
}

/// Suggestion priority, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionPriority {
    Low,
    Medium,
    High,
    Essential,
}

/// One rule-based card suggestion, as persisted and returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSuggestion {
    pub card: CardSummary,
    pub reason: String,
    pub priority: SuggestionPriority,
    pub addresses_gap: Option<GapCategory>,
    pub ownership: CardOwnership,
    /// Display price in the requesting user's preferred currency.
    pub price: Option<String>,
}

// ---------------------------------------------------------------------------
// Priority matrix
// ---------------------------------------------------------------------------

/// Priority from gap severity and ownership. An owned-and-available card
/// costs nothing to slot in, so it ranks one step above an unowned card
/// addressing the same gap.
pub fn priority_for(severity: GapSeverity, owned_and_available: bool) -> SuggestionPriority {
    match (severity, owned_and_available) {
        (GapSeverity::High, true) => SuggestionPriority::Essential,
        (GapSeverity::High, false) => SuggestionPriority::High,
        (GapSeverity::Medium, true) => SuggestionPriority::High,
        (GapSeverity::Medium, false) => SuggestionPriority::Medium,
        (GapSeverity::Low, true) => SuggestionPriority::Medium,
        (GapSeverity::Low, false) => SuggestionPriority::Low,
    }
}

/// Order suggestions for output: priority descending, then owned-and-available
/// ahead of unowned, then card name ascending as the deterministic tiebreak.
pub fn rank_suggestions(suggestions: &mut [RuleSuggestion]) {
    suggestions.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| {
                let a_avail = a.ownership.available_quantity > 0;
                let b_avail = b.ownership.available_quantity > 0;
                b_avail.cmp(&a_avail)
            })
            .then_with(|| a.card.name.cmp(&b.card.name))
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str) -> CardSummary {
        CardSummary {
            oracle_id: Uuid::new_v4(),
            name: name.to_string(),
            mana_cost: None,
            type_line: "Instant".to_string(),
            colors: vec![],
            cmc: 2.0,
        }
    }

    fn suggestion(name: &str, priority: SuggestionPriority, available: i64) -> RuleSuggestion {
        RuleSuggestion {
            card: summary(name),
            reason: "test".to_string(),
            priority,
            addresses_gap: Some(GapCategory::Removal),
            ownership: CardOwnership::from_totals(available, 0),
            price: None,
        }
    }

    // -- priority matrix --

    #[test]
    fn high_severity_owned_is_essential() {
        assert_eq!(
            priority_for(GapSeverity::High, true),
            SuggestionPriority::Essential
        );
        assert_eq!(
            priority_for(GapSeverity::High, false),
            SuggestionPriority::High
        );
    }

    #[test]
    fn ownership_raises_priority_one_step() {
        assert_eq!(
            priority_for(GapSeverity::Medium, true),
            SuggestionPriority::High
        );
        assert_eq!(
            priority_for(GapSeverity::Low, true),
            SuggestionPriority::Medium
        );
        assert_eq!(
            priority_for(GapSeverity::Low, false),
            SuggestionPriority::Low
        );
    }

    // -- ranking --

    #[test]
    fn ranking_puts_higher_priority_first() {
        let mut suggestions = vec![
            suggestion("Low Card", SuggestionPriority::Low, 0),
            suggestion("Essential Card", SuggestionPriority::Essential, 1),
            suggestion("Medium Card", SuggestionPriority::Medium, 0),
        ];
        rank_suggestions(&mut suggestions);
        assert_eq!(suggestions[0].card.name, "Essential Card");
        assert_eq!(suggestions[2].card.name, "Low Card");
    }

    #[test]
    fn available_breaks_ties_at_equal_priority() {
        let mut suggestions = vec![
            suggestion("Unowned", SuggestionPriority::High, 0),
            suggestion("Available", SuggestionPriority::High, 2),
        ];
        rank_suggestions(&mut suggestions);
        assert_eq!(suggestions[0].card.name, "Available");
    }

    #[test]
    fn name_is_the_final_tiebreak() {
        let mut suggestions = vec![
            suggestion("Zephyr", SuggestionPriority::High, 0),
            suggestion("Anthem", SuggestionPriority::High, 0),
        ];
        rank_suggestions(&mut suggestions);
        assert_eq!(suggestions[0].card.name, "Anthem");
    }

    #[test]
    fn suggestion_serializes_camel_case() {
        let value = serde_json::to_value(suggestion("Card", SuggestionPriority::High, 1)).unwrap();
        assert_eq!(value["priority"], "high");
        assert_eq!(value["addressesGap"], "removal");
        assert!(value["ownership"]["availableQuantity"].is_number());
    }
}
