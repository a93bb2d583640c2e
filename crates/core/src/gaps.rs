//! Gap analysis: a pure rule engine mapping aggregated deck statistics to a
//! set of structural weaknesses with severities.
//!
//! Thresholds are format-sensitive and versioned: every recommendation row
//! records the [`ALGORITHM_VERSION`] that produced it, and any threshold
//! change requires bumping the version so old recommendations stay auditable.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::card::{is_land, primary_type, Format};
use crate::stats::{DeckStats, ResolvedDeckCard, CURVE_TERMINAL_BUCKET};

/// Version of the gap thresholds and category heuristics below.
pub const ALGORITHM_VERSION: &str = "gaps-v1";

// ---------------------------------------------------------------------------
// Categories and severities
// ---------------------------------------------------------------------------

/// Functional role a deck can be short on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapCategory {
    Ramp,
    CardDraw,
    Removal,
    BoardWipes,
    Interaction,
    Protection,
    Recursion,
    Tutors,
    Wincons,
    Creatures,
    Lands,
    Curve,
}

/// Category evaluation order. Gap output is emitted in this order, so the
/// result is deterministic for a given input.
pub const ALL_CATEGORIES: [GapCategory; 12] = [
    GapCategory::Ramp,
    GapCategory::CardDraw,
    GapCategory::Removal,
    GapCategory::BoardWipes,
    GapCategory::Interaction,
    GapCategory::Protection,
    GapCategory::Recursion,
    GapCategory::Tutors,
    GapCategory::Wincons,
    GapCategory::Creatures,
    GapCategory::Lands,
    GapCategory::Curve,
];

impl GapCategory {
    /// Category name as stored and transmitted.
    pub fn as_name(self) -> &'static str {
        match self {
            Self::Ramp => "ramp",
            Self::CardDraw => "card_draw",
            Self::Removal => "removal",
            Self::BoardWipes => "board_wipes",
            Self::Interaction => "interaction",
            Self::Protection => "protection",
            Self::Recursion => "recursion",
            Self::Tutors => "tutors",
            Self::Wincons => "wincons",
            Self::Creatures => "creatures",
            Self::Lands => "lands",
            Self::Curve => "curve",
        }
    }

    /// Human-readable label used in gap descriptions and suggestion reasons.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ramp => "mana acceleration",
            Self::CardDraw => "card draw",
            Self::Removal => "targeted removal",
            Self::BoardWipes => "mass removal",
            Self::Interaction => "instant-speed interaction",
            Self::Protection => "protection effects",
            Self::Recursion => "graveyard recursion",
            Self::Tutors => "tutor effects",
            Self::Wincons => "win conditions",
            Self::Creatures => "creatures",
            Self::Lands => "lands",
            Self::Curve => "mana curve",
        }
    }
}

/// How far below threshold the observed count fell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapSeverity {
    Low,
    Medium,
    High,
}

/// One detected weakness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckGap {
    pub category: GapCategory,
    pub severity: GapSeverity,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Minimum counts per category for one format. `None` means the category is
/// not evaluated for that format.
#[derive(Debug, Clone, Copy)]
pub struct FormatThresholds {
    pub ramp: Option<i64>,
    pub card_draw: Option<i64>,
    pub removal: Option<i64>,
    pub board_wipes: Option<i64>,
    pub interaction: Option<i64>,
    pub protection: Option<i64>,
    pub recursion: Option<i64>,
    pub tutors: Option<i64>,
    pub wincons: Option<i64>,
    pub creatures: Option<i64>,
    pub lands: Option<i64>,
    /// Average nonland mana value above which a curve gap fires.
    pub avg_cmc_ceiling: Option<f64>,
}

impl FormatThresholds {
    /// Threshold table for a format. 99-card singleton formats expect far
    /// more role redundancy than 60-card constructed; limited and casual
    /// only get the structural minimums.
    pub fn for_format(format: Format) -> Self {
        match format {
            Format::Commander | Format::Duel => Self {
                ramp: Some(10),
                card_draw: Some(10),
                removal: Some(8),
                board_wipes: Some(3),
                interaction: Some(5),
                protection: Some(3),
                recursion: Some(2),
                tutors: Some(2),
                wincons: Some(3),
                creatures: Some(20),
                lands: Some(35),
                avg_cmc_ceiling: Some(3.5),
            },
            Format::Brawl => Self {
                ramp: Some(8),
                card_draw: Some(8),
                removal: Some(6),
                board_wipes: Some(2),
                interaction: Some(4),
                protection: Some(2),
                recursion: None,
                tutors: None,
                wincons: Some(2),
                creatures: Some(15),
                lands: Some(24),
                avg_cmc_ceiling: Some(3.5),
            },
            Format::Standard
            | Format::Modern
            | Format::Pioneer
            | Format::Legacy
            | Format::Vintage
            | Format::Pauper => Self {
                ramp: None,
                card_draw: Some(6),
                removal: Some(6),
                board_wipes: Some(2),
                interaction: Some(4),
                protection: None,
                recursion: None,
                tutors: None,
                wincons: Some(4),
                creatures: Some(12),
                lands: Some(22),
                avg_cmc_ceiling: Some(3.0),
            },
            Format::Limited => Self {
                ramp: None,
                card_draw: None,
                removal: Some(4),
                board_wipes: None,
                interaction: None,
                protection: None,
                recursion: None,
                tutors: None,
                wincons: None,
                creatures: Some(12),
                lands: Some(16),
                avg_cmc_ceiling: Some(3.5),
            },
            Format::Casual => Self {
                ramp: None,
                card_draw: None,
                removal: None,
                board_wipes: None,
                interaction: None,
                protection: None,
                recursion: None,
                tutors: None,
                wincons: None,
                creatures: None,
                lands: None,
                avg_cmc_ceiling: None,
            },
        }
    }

    fn get(&self, category: GapCategory) -> Option<i64> {
        match category {
            GapCategory::Ramp => self.ramp,
            GapCategory::CardDraw => self.card_draw,
            GapCategory::Removal => self.removal,
            GapCategory::BoardWipes => self.board_wipes,
            GapCategory::Interaction => self.interaction,
            GapCategory::Protection => self.protection,
            GapCategory::Recursion => self.recursion,
            GapCategory::Tutors => self.tutors,
            GapCategory::Wincons => self.wincons,
            GapCategory::Creatures => self.creatures,
            GapCategory::Lands => self.lands,
            GapCategory::Curve => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Card categorization
// ---------------------------------------------------------------------------

/// Classify what functional roles a card fills, by type line and oracle
/// text keywords. One card can fill several roles.
///
/// The same heuristics drive both sides of the recommendation pipeline:
/// counting what a deck already has, and searching the catalog for
/// candidates that would fill a gap.
pub fn categorize_card(type_line: &str, oracle_text: Option<&str>) -> Vec<GapCategory> {
    let text = oracle_text.unwrap_or("").to_lowercase();
    let land = is_land(type_line);
    let ptype = primary_type(type_line);
    let mut roles = Vec::new();

    if !land && (text.contains("add {") || (text.contains("search your library") && text.contains("land")))
    {
        roles.push(GapCategory::Ramp);
    }
    if text.contains("draw a card") || text.contains("draw two") || text.contains("draw three") || text.contains("draws a card")
    {
        roles.push(GapCategory::CardDraw);
    }
    if text.contains("destroy target") || text.contains("exile target") {
        roles.push(GapCategory::Removal);
    }
    if text.contains("destroy all") || text.contains("exile all") || text.contains("destroy each")
    {
        roles.push(GapCategory::BoardWipes);
    }
    if text.contains("counter target") {
        roles.push(GapCategory::Interaction);
    }
    if text.contains("hexproof")
        || text.contains("indestructible")
        || text.contains("protection from")
        || text.contains("ward {")
    {
        roles.push(GapCategory::Protection);
    }
    if text.contains("from your graveyard to") || text.contains("return target") && text.contains("graveyard")
    {
        roles.push(GapCategory::Recursion);
    }
    if text.contains("search your library for a card") {
        roles.push(GapCategory::Tutors);
    }
    if text.contains("wins the game") || text.contains("loses the game") || ptype == "planeswalker"
    {
        roles.push(GapCategory::Wincons);
    }
    if ptype == "creature" {
        roles.push(GapCategory::Creatures);
    }
    if land {
        roles.push(GapCategory::Lands);
    }

    roles
}

/// Count how many cards (by summed quantity) fill each role in a deck.
pub fn count_categories(cards: &[ResolvedDeckCard]) -> HashMap<GapCategory, i64> {
    let mut counts: HashMap<GapCategory, i64> = HashMap::new();
    for card in cards {
        for role in categorize_card(&card.type_line, card.oracle_text.as_deref()) {
            *counts.entry(role).or_insert(0) += i64::from(card.quantity);
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Severity from how far `observed` falls below `threshold`: at two thirds
/// or more of the threshold the gap is low, at one third medium, below that
/// high.
fn severity_for(observed: i64, threshold: i64) -> GapSeverity {
    if observed * 3 >= threshold * 2 {
        GapSeverity::Low
    } else if observed * 3 >= threshold {
        GapSeverity::Medium
    } else {
        GapSeverity::High
    }
}

/// Run gap analysis over aggregated statistics and role counts.
///
/// Empty decks produce no gaps: analysis of a deck with no cards would flag
/// every category at maximum severity, which is noise rather than signal.
pub fn analyze(
    stats: &DeckStats,
    counts: &HashMap<GapCategory, i64>,
    format: Format,
) -> Vec<DeckGap> {
    if stats.total_cards == 0 {
        return Vec::new();
    }

    let thresholds = FormatThresholds::for_format(format);
    let mut gaps = Vec::new();

    for category in ALL_CATEGORIES {
        if category == GapCategory::Curve {
            if let Some(gap) = curve_gap(stats, &thresholds) {
                gaps.push(gap);
            }
            continue;
        }
        let Some(threshold) = thresholds.get(category) else {
            continue;
        };
        let observed = counts.get(&category).copied().unwrap_or(0);
        if observed >= threshold {
            continue;
        }
        gaps.push(DeckGap {
            category,
            severity: severity_for(observed, threshold),
            description: format!(
                "{} source{} of {} found, {} format decks typically run at least {}",
                observed,
                if observed == 1 { "" } else { "s" },
                category.label(),
                format.as_name(),
                threshold
            ),
        });
    }

    gaps
}

/// Curve gap: fires when the average nonland mana value exceeds the format
/// ceiling. The terminal curve bucket is averaged at its lower bound.
fn curve_gap(stats: &DeckStats, thresholds: &FormatThresholds) -> Option<DeckGap> {
    let ceiling = thresholds.avg_cmc_ceiling?;

    let mut nonland_cards: i64 = 0;
    let mut weighted: f64 = 0.0;
    for (bucket, count) in &stats.mana_curve {
        let value: f64 = if bucket == CURVE_TERMINAL_BUCKET {
            7.0
        } else {
            bucket.parse().ok()?
        };
        nonland_cards += count;
        weighted += value * *count as f64;
    }
    if nonland_cards == 0 {
        return None;
    }

    let average = weighted / nonland_cards as f64;
    if average <= ceiling {
        return None;
    }

    // Severity scales with how far the average overshoots.
    let severity = if average > ceiling + 1.5 {
        GapSeverity::High
    } else if average > ceiling + 0.75 {
        GapSeverity::Medium
    } else {
        GapSeverity::Low
    };

    Some(DeckGap {
        category: GapCategory::Curve,
        severity,
        description: format!(
            "average mana value is {average:.2}, above the {ceiling:.1} ceiling for this format"
        ),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::PrintPrices;
    use crate::stats::aggregate;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn card(name: &str, quantity: i32, cmc: f64, type_line: &str, text: &str) -> ResolvedDeckCard {
        ResolvedDeckCard {
            card_print_id: name.len() as i64,
            oracle_id: Uuid::new_v4(),
            name: name.to_string(),
            quantity,
            cmc,
            colors: vec![],
            type_line: type_line.to_string(),
            oracle_text: if text.is_empty() {
                None
            } else {
                Some(text.to_string())
            },
            prices: PrintPrices::default(),
            foil_only: false,
        }
    }

    // -- categorization --

    #[test]
    fn ramp_matches_nonland_mana_sources() {
        let roles = categorize_card("Artifact", Some("{T}: Add {C}{C}."));
        assert!(roles.contains(&GapCategory::Ramp));
    }

    #[test]
    fn lands_are_not_ramp() {
        let roles = categorize_card("Basic Land \u{2014} Forest", Some("{T}: Add {G}."));
        assert!(!roles.contains(&GapCategory::Ramp));
        assert!(roles.contains(&GapCategory::Lands));
    }

    #[test]
    fn one_card_can_fill_several_roles() {
        let roles = categorize_card(
            "Creature \u{2014} Elf Druid",
            Some("When this creature enters, draw a card."),
        );
        assert!(roles.contains(&GapCategory::Creatures));
        assert!(roles.contains(&GapCategory::CardDraw));
    }

    #[test]
    fn board_wipe_and_removal_are_distinct() {
        let wipe = categorize_card("Sorcery", Some("Destroy all creatures."));
        assert!(wipe.contains(&GapCategory::BoardWipes));
        assert!(!wipe.contains(&GapCategory::Removal));

        let spot = categorize_card("Instant", Some("Destroy target creature."));
        assert!(spot.contains(&GapCategory::Removal));
    }

    #[test]
    fn tutor_detection_requires_generic_search() {
        let tutor = categorize_card("Sorcery", Some("Search your library for a card."));
        assert!(tutor.contains(&GapCategory::Tutors));

        let fetch = categorize_card(
            "Sorcery",
            Some("Search your library for a basic land card."),
        );
        assert!(!fetch.contains(&GapCategory::Tutors));
        assert!(fetch.contains(&GapCategory::Ramp));
    }

    // -- severity --

    #[test]
    fn severity_scales_with_shortfall() {
        assert_eq!(severity_for(8, 10), GapSeverity::Low);
        assert_eq!(severity_for(5, 10), GapSeverity::Medium);
        assert_eq!(severity_for(2, 10), GapSeverity::High);
        assert_eq!(severity_for(0, 10), GapSeverity::High);
    }

    // -- analysis --

    fn stats_for(cards: &[ResolvedDeckCard]) -> DeckStats {
        aggregate(cards, &HashMap::new())
    }

    #[test]
    fn empty_deck_produces_no_gaps() {
        let stats = stats_for(&[]);
        let gaps = analyze(&stats, &HashMap::new(), Format::Commander);
        assert!(gaps.is_empty());
    }

    #[test]
    fn commander_deck_without_ramp_flags_ramp_high() {
        let cards = vec![card("Bear", 1, 2.0, "Creature \u{2014} Bear", "")];
        let stats = stats_for(&cards);
        let counts = count_categories(&cards);
        let gaps = analyze(&stats, &counts, Format::Commander);
        let ramp = gaps
            .iter()
            .find(|g| g.category == GapCategory::Ramp)
            .unwrap();
        assert_eq!(ramp.severity, GapSeverity::High);
    }

    #[test]
    fn category_at_threshold_is_not_a_gap() {
        let cards = vec![card("Rock", 10, 2.0, "Artifact", "{T}: Add {C}.")];
        let stats = stats_for(&cards);
        let counts = count_categories(&cards);
        let gaps = analyze(&stats, &counts, Format::Commander);
        assert!(!gaps.iter().any(|g| g.category == GapCategory::Ramp));
    }

    #[test]
    fn casual_format_only_checks_curve() {
        let cards = vec![card("Bear", 1, 2.0, "Creature \u{2014} Bear", "")];
        let stats = stats_for(&cards);
        let counts = count_categories(&cards);
        let gaps = analyze(&stats, &counts, Format::Casual);
        assert!(gaps.is_empty());
    }

    #[test]
    fn top_heavy_curve_fires_curve_gap() {
        let cards = vec![card("Dragon", 20, 6.0, "Creature \u{2014} Dragon", "")];
        let stats = stats_for(&cards);
        let counts = count_categories(&cards);
        let gaps = analyze(&stats, &counts, Format::Standard);
        let curve = gaps
            .iter()
            .find(|g| g.category == GapCategory::Curve)
            .unwrap();
        assert_eq!(curve.severity, GapSeverity::High);
    }

    #[test]
    fn lands_do_not_move_the_curve() {
        let mut cards = vec![card("Two Drop", 20, 2.0, "Creature \u{2014} Bear", "")];
        cards.push(card("Wastes", 40, 0.0, "Basic Land \u{2014} Wastes", ""));
        let stats = stats_for(&cards);
        let counts = count_categories(&cards);
        let gaps = analyze(&stats, &counts, Format::Standard);
        assert!(!gaps.iter().any(|g| g.category == GapCategory::Curve));
    }

    #[test]
    fn output_order_follows_category_table() {
        let cards = vec![card("Bear", 1, 2.0, "Creature \u{2014} Bear", "")];
        let stats = stats_for(&cards);
        let gaps = analyze(&stats, &HashMap::new(), Format::Commander);
        let order: Vec<GapCategory> = gaps.iter().map(|g| g.category).collect();
        let mut sorted = order.clone();
        sorted.sort_by_key(|c| ALL_CATEGORIES.iter().position(|x| x == c).unwrap());
        assert_eq!(order, sorted);
    }

    #[test]
    fn gap_serializes_snake_case_category() {
        let gap = DeckGap {
            category: GapCategory::CardDraw,
            severity: GapSeverity::Medium,
            description: "test".into(),
        };
        let value = serde_json::to_value(&gap).unwrap();
        assert_eq!(value["category"], "card_draw");
        assert_eq!(value["severity"], "medium");
    }
}
