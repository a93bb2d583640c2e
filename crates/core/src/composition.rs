//! Deck composition rules: pure validation invoked on every deck-card
//! mutation, before anything is committed.
//!
//! Callers build the hypothetical post-mutation state of a section and pass
//! it here; the database layer commits only when validation passes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::card::{is_basic_land, Color};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Rule names
// ---------------------------------------------------------------------------

/// Rule names reported in violations. These are part of the API contract.
pub const RULE_MAX_CARDS: &str = "maxCards";
pub const RULE_SINGLETON: &str = "singleton";
pub const RULE_COLOR_IDENTITY: &str = "colorIdentity";
pub const RULE_REORDER_MEMBERSHIP: &str = "reorder-membership";

// ---------------------------------------------------------------------------
// Section rules
// ---------------------------------------------------------------------------

/// Structural rules attached to a deck section. Stored as JSON on the
/// section row; absent fields mean the rule is not enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionRules {
    /// Cap on the sum of quantities in the section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cards: Option<i32>,
    /// At most one copy per rules identity (basic lands exempt).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub singleton: Option<bool>,
    /// Every card's colors must be a subset of this set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_identity: Option<Vec<Color>>,
}

impl SectionRules {
    pub fn is_empty(&self) -> bool {
        self.max_cards.is_none() && self.singleton.is_none() && self.color_identity.is_none()
    }
}

// ---------------------------------------------------------------------------
// Composition state
// ---------------------------------------------------------------------------

/// One row of a section's (hypothetical) card list, resolved to the fields
/// the rules need.
#[derive(Debug, Clone)]
pub struct CompositionCard {
    pub card_print_id: DbId,
    /// Rules identity shared by all prints of the same card.
    pub oracle_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub colors: Vec<Color>,
    pub type_line: String,
}

/// A rejected composition mutation. `rule` names the failed check; `limit`
/// and `attempted` are filled where the rule is numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionViolation {
    pub rule: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempted: Option<i64>,
    pub detail: String,
}

impl std::fmt::Display for CompositionViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.rule, self.detail)
    }
}

// ---------------------------------------------------------------------------
// Section validation
// ---------------------------------------------------------------------------

/// Validate the hypothetical post-mutation state of a section.
///
/// Checks run in a fixed order (`maxCards`, `singleton`, `colorIdentity`)
/// and the first failure is returned. A `None` rule is not enforced.
pub fn validate_section(
    rules: &SectionRules,
    cards: &[CompositionCard],
) -> Result<(), CompositionViolation> {
    if let Some(limit) = rules.max_cards {
        check_max_cards(limit, cards)?;
    }
    if rules.singleton == Some(true) {
        check_singleton(cards)?;
    }
    if let Some(identity) = &rules.color_identity {
        check_color_identity(identity, cards)?;
    }
    Ok(())
}

fn check_max_cards(limit: i32, cards: &[CompositionCard]) -> Result<(), CompositionViolation> {
    let total: i64 = cards.iter().map(|c| i64::from(c.quantity)).sum();
    if total > i64::from(limit) {
        return Err(CompositionViolation {
            rule: RULE_MAX_CARDS,
            limit: Some(i64::from(limit)),
            attempted: Some(total),
            detail: format!("section would hold {total} cards, limit is {limit}"),
        });
    }
    Ok(())
}

fn check_singleton(cards: &[CompositionCard]) -> Result<(), CompositionViolation> {
    let mut by_oracle: std::collections::HashMap<Uuid, (i64, &str)> =
        std::collections::HashMap::new();
    for card in cards {
        if is_basic_land(&card.type_line) {
            continue;
        }
        let entry = by_oracle
            .entry(card.oracle_id)
            .or_insert((0, card.name.as_str()));
        entry.0 += i64::from(card.quantity);
    }
    // Deterministic reporting: pick the worst offender by count, name-ordered.
    let offender = by_oracle
        .values()
        .filter(|(count, _)| *count > 1)
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)));
    if let Some(&(count, name)) = offender {
        return Err(CompositionViolation {
            rule: RULE_SINGLETON,
            limit: Some(1),
            attempted: Some(count),
            detail: format!("'{name}' would appear {count} times in a singleton section"),
        });
    }
    Ok(())
}

fn check_color_identity(
    identity: &[Color],
    cards: &[CompositionCard],
) -> Result<(), CompositionViolation> {
    for card in cards {
        if let Some(color) = card.colors.iter().find(|c| !identity.contains(c)) {
            return Err(CompositionViolation {
                rule: RULE_COLOR_IDENTITY,
                limit: None,
                attempted: None,
                detail: format!(
                    "'{}' has color {} outside the section color identity",
                    card.name,
                    color.as_letter()
                ),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reorder membership
// ---------------------------------------------------------------------------

/// Check that a reorder request supplies exactly the current membership: no
/// additions, omissions, or duplicates. Positions `0..n-1` are then assigned
/// in the requested order by the caller.
pub fn validate_reorder(
    current_ids: &[DbId],
    requested_ids: &[DbId],
) -> Result<(), CompositionViolation> {
    let membership_violation = |detail: String| CompositionViolation {
        rule: RULE_REORDER_MEMBERSHIP,
        limit: Some(current_ids.len() as i64),
        attempted: Some(requested_ids.len() as i64),
        detail,
    };

    if requested_ids.len() != current_ids.len() {
        return Err(membership_violation(format!(
            "expected {} ids, got {}",
            current_ids.len(),
            requested_ids.len()
        )));
    }

    let current: std::collections::HashSet<DbId> = current_ids.iter().copied().collect();
    let mut seen = std::collections::HashSet::with_capacity(requested_ids.len());
    for &id in requested_ids {
        if !current.contains(&id) {
            return Err(membership_violation(format!("id {id} is not in the section")));
        }
        if !seen.insert(id) {
            return Err(membership_violation(format!("id {id} appears more than once")));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn card(print: DbId, oracle: u128, name: &str, quantity: i32) -> CompositionCard {
        CompositionCard {
            card_print_id: print,
            oracle_id: Uuid::from_u128(oracle),
            name: name.to_string(),
            quantity,
            colors: vec![],
            type_line: "Creature \u{2014} Test".to_string(),
        }
    }

    fn colored(mut c: CompositionCard, colors: Vec<Color>) -> CompositionCard {
        c.colors = colors;
        c
    }

    // -- maxCards --

    #[test]
    fn max_cards_accepts_at_limit() {
        let rules = SectionRules {
            max_cards: Some(2),
            ..Default::default()
        };
        let cards = vec![card(1, 1, "Alpha", 1), card(2, 2, "Beta", 1)];
        assert!(validate_section(&rules, &cards).is_ok());
    }

    #[test]
    fn max_cards_rejects_third_card() {
        let rules = SectionRules {
            max_cards: Some(2),
            ..Default::default()
        };
        let cards = vec![
            card(1, 1, "Alpha", 1),
            card(2, 2, "Beta", 1),
            card(3, 3, "Gamma", 1),
        ];
        let violation = validate_section(&rules, &cards).unwrap_err();
        assert_eq!(violation.rule, RULE_MAX_CARDS);
        assert_eq!(violation.limit, Some(2));
        assert_eq!(violation.attempted, Some(3));
    }

    #[test]
    fn max_cards_counts_quantities_not_rows() {
        let rules = SectionRules {
            max_cards: Some(3),
            ..Default::default()
        };
        let cards = vec![card(1, 1, "Alpha", 4)];
        assert!(validate_section(&rules, &cards).is_err());
    }

    // -- singleton --

    #[test]
    fn singleton_rejects_duplicate_oracle_across_prints() {
        let rules = SectionRules {
            singleton: Some(true),
            ..Default::default()
        };
        // Two different prints of the same rules identity.
        let cards = vec![card(1, 42, "Lightning Bolt", 1), card(2, 42, "Lightning Bolt", 1)];
        let violation = validate_section(&rules, &cards).unwrap_err();
        assert_eq!(violation.rule, RULE_SINGLETON);
        assert_eq!(violation.attempted, Some(2));
    }

    #[test]
    fn singleton_rejects_quantity_above_one() {
        let rules = SectionRules {
            singleton: Some(true),
            ..Default::default()
        };
        let cards = vec![card(1, 42, "Lightning Bolt", 2)];
        assert!(validate_section(&rules, &cards).is_err());
    }

    #[test]
    fn singleton_exempts_basic_lands() {
        let rules = SectionRules {
            singleton: Some(true),
            ..Default::default()
        };
        let mut forest = card(1, 7, "Forest", 30);
        forest.type_line = "Basic Land \u{2014} Forest".to_string();
        assert!(validate_section(&rules, &[forest]).is_ok());
    }

    #[test]
    fn singleton_false_is_not_enforced() {
        let rules = SectionRules {
            singleton: Some(false),
            ..Default::default()
        };
        let cards = vec![card(1, 42, "Lightning Bolt", 4)];
        assert!(validate_section(&rules, &cards).is_ok());
    }

    // -- colorIdentity --

    #[test]
    fn color_identity_accepts_subset_and_colorless() {
        let rules = SectionRules {
            color_identity: Some(vec![Color::White, Color::Blue]),
            ..Default::default()
        };
        let cards = vec![
            colored(card(1, 1, "Azorius Charm", 1), vec![Color::White, Color::Blue]),
            colored(card(2, 2, "Sol Ring", 1), vec![]),
        ];
        assert!(validate_section(&rules, &cards).is_ok());
    }

    #[test]
    fn color_identity_rejects_off_color_card() {
        let rules = SectionRules {
            color_identity: Some(vec![Color::White]),
            ..Default::default()
        };
        let cards = vec![colored(card(1, 1, "Murder", 1), vec![Color::Black])];
        let violation = validate_section(&rules, &cards).unwrap_err();
        assert_eq!(violation.rule, RULE_COLOR_IDENTITY);
        assert!(violation.detail.contains("Murder"));
    }

    // -- rule ordering --

    #[test]
    fn max_cards_is_checked_before_singleton() {
        let rules = SectionRules {
            max_cards: Some(1),
            singleton: Some(true),
            ..Default::default()
        };
        let cards = vec![card(1, 42, "Lightning Bolt", 3)];
        let violation = validate_section(&rules, &cards).unwrap_err();
        assert_eq!(violation.rule, RULE_MAX_CARDS);
    }

    #[test]
    fn empty_rules_accept_anything() {
        let cards = vec![card(1, 1, "Alpha", 99)];
        assert!(validate_section(&SectionRules::default(), &cards).is_ok());
    }

    // -- reorder membership --

    #[test]
    fn reorder_accepts_permutation() {
        assert!(validate_reorder(&[1, 2, 3], &[3, 1, 2]).is_ok());
    }

    #[test]
    fn reorder_is_idempotent_on_identity() {
        assert!(validate_reorder(&[1, 2, 3], &[1, 2, 3]).is_ok());
    }

    #[test]
    fn reorder_rejects_missing_id() {
        let violation = validate_reorder(&[1, 2, 3], &[1, 2]).unwrap_err();
        assert_eq!(violation.rule, RULE_REORDER_MEMBERSHIP);
        assert_eq!(violation.limit, Some(3));
        assert_eq!(violation.attempted, Some(2));
    }

    #[test]
    fn reorder_rejects_foreign_id() {
        let violation = validate_reorder(&[1, 2, 3], &[1, 2, 9]).unwrap_err();
        assert_eq!(violation.rule, RULE_REORDER_MEMBERSHIP);
        assert!(violation.detail.contains('9'));
    }

    #[test]
    fn reorder_rejects_duplicate_id() {
        let violation = validate_reorder(&[1, 2, 3], &[1, 2, 2]).unwrap_err();
        assert_eq!(violation.rule, RULE_REORDER_MEMBERSHIP);
        assert!(violation.detail.contains("more than once"));
    }

    // -- rules serde --

    #[test]
    fn rules_round_trip_camel_case() {
        let rules = SectionRules {
            max_cards: Some(2),
            singleton: Some(true),
            color_identity: Some(vec![Color::Green]),
        };
        let value = serde_json::to_value(&rules).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"maxCards": 2, "singleton": true, "colorIdentity": ["G"]})
        );
        let parsed: SectionRules = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, rules);
    }

    #[test]
    fn absent_rules_deserialize_as_none() {
        let parsed: SectionRules = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_empty());
    }
}
