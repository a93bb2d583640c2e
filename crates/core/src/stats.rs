//! Deck statistics aggregation: a pure fold over a deck's resolved cards
//! plus per-print availability from the ownership ledger.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::card::{is_land, primary_type, Color, Currency, PrintPrices};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Curve bucketing
// ---------------------------------------------------------------------------

/// Mana values at or above this value land in the terminal curve bucket.
pub const CURVE_TERMINAL_THRESHOLD: f64 = 7.0;
/// Label of the terminal curve bucket.
pub const CURVE_TERMINAL_BUCKET: &str = "7+";

/// Bucket a mana value for the curve: floor to an integer, with a single
/// terminal bucket for everything at 7 and above. Fractional costs are not
/// rounded up; half costs bucket with their floor.
pub fn curve_bucket(cmc: f64) -> String {
    if cmc >= CURVE_TERMINAL_THRESHOLD {
        CURVE_TERMINAL_BUCKET.to_string()
    } else {
        (cmc.max(0.0).floor() as i64).to_string()
    }
}

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// A deck card joined to its print and rules identity, as the database
/// layer loads it. One value per deck-card row.
#[derive(Debug, Clone)]
pub struct ResolvedDeckCard {
    pub card_print_id: DbId,
    pub oracle_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub cmc: f64,
    pub colors: Vec<Color>,
    pub type_line: String,
    pub oracle_text: Option<String>,
    pub prices: PrintPrices,
    /// The print exists only in foil, so foil prices are the ones that apply.
    pub foil_only: bool,
}

/// Aggregated deck statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    pub total_cards: i64,
    /// Distinct rules identities.
    pub unique_cards: i64,
    pub total_value_usd: Option<f64>,
    pub total_value_eur: Option<f64>,
    /// Summed quantities per curve bucket; lands are excluded. Only occupied
    /// buckets appear.
    pub mana_curve: BTreeMap<String, i64>,
    /// A multicolor card counts its full quantity under each of its colors.
    pub color_distribution: BTreeMap<Color, i64>,
    pub type_distribution: BTreeMap<String, i64>,
    pub owned_count: i64,
    pub missing_count: i64,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate deck statistics.
///
/// `availability` maps card print ids to available quantity (owned minus
/// used elsewhere); prints not in the map count as unavailable. Availability
/// is consumed as rows are folded, so the same print appearing in two
/// sections cannot be counted as owned twice.
pub fn aggregate(cards: &[ResolvedDeckCard], availability: &HashMap<DbId, i64>) -> DeckStats {
    let mut total_cards: i64 = 0;
    let mut oracles: HashSet<Uuid> = HashSet::new();
    let mut mana_curve: BTreeMap<String, i64> = BTreeMap::new();
    let mut color_distribution: BTreeMap<Color, i64> = BTreeMap::new();
    let mut type_distribution: BTreeMap<String, i64> = BTreeMap::new();
    let mut total_value_usd: Option<f64> = None;
    let mut total_value_eur: Option<f64> = None;
    let mut owned_count: i64 = 0;
    let mut missing_count: i64 = 0;
    let mut remaining: HashMap<DbId, i64> = availability.clone();

    for card in cards {
        let quantity = i64::from(card.quantity);
        total_cards += quantity;
        oracles.insert(card.oracle_id);

        if !is_land(&card.type_line) {
            *mana_curve.entry(curve_bucket(card.cmc)).or_insert(0) += quantity;
        }

        for &color in &card.colors {
            *color_distribution.entry(color).or_insert(0) += quantity;
        }

        *type_distribution
            .entry(primary_type(&card.type_line).to_string())
            .or_insert(0) += quantity;

        if let Some(price) = card.prices.best(Currency::Usd, card.foil_only) {
            *total_value_usd.get_or_insert(0.0) += price * quantity as f64;
        }
        if let Some(price) = card.prices.best(Currency::Eur, card.foil_only) {
            *total_value_eur.get_or_insert(0.0) += price * quantity as f64;
        }

        let available = remaining.entry(card.card_print_id).or_insert(0);
        let owned_here = (*available).clamp(0, quantity);
        *available -= owned_here;
        owned_count += owned_here;
        missing_count += quantity - owned_here;
    }

    DeckStats {
        total_cards,
        unique_cards: oracles.len() as i64,
        total_value_usd,
        total_value_eur,
        mana_curve,
        color_distribution,
        type_distribution,
        owned_count,
        missing_count,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(print: DbId, oracle: u128, name: &str, quantity: i32, cmc: f64) -> ResolvedDeckCard {
        ResolvedDeckCard {
            card_print_id: print,
            oracle_id: Uuid::from_u128(oracle),
            name: name.to_string(),
            quantity,
            cmc,
            colors: vec![],
            type_line: "Creature \u{2014} Test".to_string(),
            oracle_text: None,
            prices: PrintPrices::default(),
            foil_only: false,
        }
    }

    fn no_availability() -> HashMap<DbId, i64> {
        HashMap::new()
    }

    // -- mana curve --

    #[test]
    fn mana_curve_groups_summed_quantities() {
        // Two prints at cmc 1 (qty 4 + 2) and one at cmc 3 (qty 1).
        let cards = vec![
            resolved(1, 1, "One Drop A", 4, 1.0),
            resolved(2, 2, "One Drop B", 2, 1.0),
            resolved(3, 3, "Three Drop", 1, 3.0),
        ];
        let stats = aggregate(&cards, &no_availability());
        assert_eq!(stats.mana_curve.get("1"), Some(&6));
        assert_eq!(stats.mana_curve.get("3"), Some(&1));
        assert_eq!(stats.mana_curve.len(), 2);
    }

    #[test]
    fn mana_curve_floors_fractional_costs() {
        let cards = vec![resolved(1, 1, "Half Cost", 1, 2.5)];
        let stats = aggregate(&cards, &no_availability());
        assert_eq!(stats.mana_curve.get("2"), Some(&1));
    }

    #[test]
    fn mana_curve_terminal_bucket_collects_high_costs() {
        let cards = vec![
            resolved(1, 1, "Seven", 1, 7.0),
            resolved(2, 2, "Ten", 2, 10.0),
        ];
        let stats = aggregate(&cards, &no_availability());
        assert_eq!(stats.mana_curve.get(CURVE_TERMINAL_BUCKET), Some(&3));
    }

    #[test]
    fn mana_curve_excludes_lands() {
        let mut forest = resolved(1, 1, "Forest", 10, 0.0);
        forest.type_line = "Basic Land \u{2014} Forest".to_string();
        let stats = aggregate(&[forest], &no_availability());
        assert!(stats.mana_curve.is_empty());
        assert_eq!(stats.total_cards, 10);
    }

    // -- color and type distribution --

    #[test]
    fn multicolor_card_counts_full_quantity_per_color() {
        let mut charm = resolved(1, 1, "Esper Charm", 3, 3.0);
        charm.colors = vec![Color::White, Color::Blue, Color::Black];
        let stats = aggregate(&[charm], &no_availability());
        assert_eq!(stats.color_distribution.get(&Color::White), Some(&3));
        assert_eq!(stats.color_distribution.get(&Color::Blue), Some(&3));
        assert_eq!(stats.color_distribution.get(&Color::Black), Some(&3));
    }

    #[test]
    fn type_distribution_uses_primary_type() {
        let mut golem = resolved(1, 1, "Golem", 2, 3.0);
        golem.type_line = "Artifact Creature \u{2014} Golem".to_string();
        let mut oddity = resolved(2, 2, "Oddity", 1, 0.0);
        oddity.type_line = "Conspiracy".to_string();
        let stats = aggregate(&[golem, oddity], &no_availability());
        assert_eq!(stats.type_distribution.get("creature"), Some(&2));
        assert_eq!(stats.type_distribution.get("other"), Some(&1));
    }

    // -- totals and uniqueness --

    #[test]
    fn unique_cards_counts_rules_identities() {
        // Two prints of the same oracle plus one distinct card.
        let cards = vec![
            resolved(1, 42, "Bolt (A)", 1, 1.0),
            resolved(2, 42, "Bolt (B)", 1, 1.0),
            resolved(3, 7, "Other", 1, 2.0),
        ];
        let stats = aggregate(&cards, &no_availability());
        assert_eq!(stats.unique_cards, 2);
        assert_eq!(stats.total_cards, 3);
    }

    // -- value --

    #[test]
    fn total_value_is_null_when_nothing_is_priced() {
        let cards = vec![resolved(1, 1, "Unpriced", 4, 1.0)];
        let stats = aggregate(&cards, &no_availability());
        assert_eq!(stats.total_value_usd, None);
        assert_eq!(stats.total_value_eur, None);
    }

    #[test]
    fn total_value_sums_quantity_times_price_per_currency() {
        let mut priced = resolved(1, 1, "Priced", 2, 1.0);
        priced.prices = PrintPrices {
            usd: Some("1.50".into()),
            usd_foil: None,
            eur: None,
            eur_foil: None,
        };
        let unpriced = resolved(2, 2, "Unpriced", 5, 2.0);
        let stats = aggregate(&[priced, unpriced], &no_availability());
        assert_eq!(stats.total_value_usd, Some(3.0));
        // No EUR datum contributed, so EUR stays unknown rather than zero.
        assert_eq!(stats.total_value_eur, None);
    }

    #[test]
    fn foil_only_print_is_valued_at_foil_price() {
        let mut foil = resolved(1, 1, "Foil Only", 1, 1.0);
        foil.foil_only = true;
        foil.prices = PrintPrices {
            usd: None,
            usd_foil: Some("9.99".into()),
            eur: None,
            eur_foil: None,
        };
        let stats = aggregate(&[foil], &no_availability());
        assert_eq!(stats.total_value_usd, Some(9.99));
    }

    // -- ownership --

    #[test]
    fn owned_is_min_of_quantity_and_availability() {
        let cards = vec![resolved(1, 1, "Partially Owned", 4, 1.0)];
        let availability = HashMap::from([(1, 2)]);
        let stats = aggregate(&cards, &availability);
        assert_eq!(stats.owned_count, 2);
        assert_eq!(stats.missing_count, 2);
    }

    #[test]
    fn availability_is_consumed_across_rows_of_the_same_print() {
        // The same print in two sections shares one pool of availability.
        let cards = vec![
            resolved(1, 1, "Shared A", 2, 1.0),
            resolved(1, 1, "Shared B", 2, 1.0),
        ];
        let availability = HashMap::from([(1, 3)]);
        let stats = aggregate(&cards, &availability);
        assert_eq!(stats.owned_count, 3);
        assert_eq!(stats.missing_count, 1);
    }

    #[test]
    fn unknown_print_counts_as_missing() {
        let cards = vec![resolved(9, 9, "Unowned", 3, 1.0)];
        let stats = aggregate(&cards, &no_availability());
        assert_eq!(stats.owned_count, 0);
        assert_eq!(stats.missing_count, 3);
    }

    // -- serialization --

    #[test]
    fn stats_serialize_with_camel_case_keys() {
        let stats = aggregate(&[resolved(1, 1, "Card", 1, 1.0)], &no_availability());
        let value = serde_json::to_value(&stats).unwrap();
        assert!(value.get("totalCards").is_some());
        assert!(value.get("manaCurve").is_some());
        assert!(value.get("ownedCount").is_some());
        assert!(value.get("totalValueUsd").is_some());
    }
}
