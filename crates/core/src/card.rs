//! Card vocabulary: colors, conditions, formats, legalities, type-line
//! classification, and price parsing.
//!
//! Catalog rows (cards and prints) are read-only to this system; these types
//! give the rest of the workspace a typed view over them.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// Mana color, stored and transmitted as its single-letter symbol.
///
/// Declaration order is WUBRG + colorless, so derived ordering matches the
/// conventional color-wheel display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "W")]
    White,
    #[serde(rename = "U")]
    Blue,
    #[serde(rename = "B")]
    Black,
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "G")]
    Green,
    #[serde(rename = "C")]
    Colorless,
}

/// All colors in display order.
pub const ALL_COLORS: [Color; 6] = [
    Color::White,
    Color::Blue,
    Color::Black,
    Color::Red,
    Color::Green,
    Color::Colorless,
];

impl Color {
    /// Parse a single-letter color symbol.
    pub fn from_letter(s: &str) -> Option<Self> {
        match s {
            "W" => Some(Self::White),
            "U" => Some(Self::Blue),
            "B" => Some(Self::Black),
            "R" => Some(Self::Red),
            "G" => Some(Self::Green),
            "C" => Some(Self::Colorless),
            _ => None,
        }
    }

    /// Single-letter symbol used in storage and on the wire.
    pub fn as_letter(self) -> &'static str {
        match self {
            Self::White => "W",
            Self::Blue => "U",
            Self::Black => "B",
            Self::Red => "R",
            Self::Green => "G",
            Self::Colorless => "C",
        }
    }
}

/// Parse a list of stored color symbols, skipping anything unrecognized.
pub fn parse_colors(letters: &[String]) -> Vec<Color> {
    letters.iter().filter_map(|s| Color::from_letter(s)).collect()
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// Physical card condition, per TCGplayer/Cardmarket grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "NM")]
    NearMint,
    #[serde(rename = "LP")]
    LightlyPlayed,
    #[serde(rename = "MP")]
    ModeratelyPlayed,
    #[serde(rename = "HP")]
    HeavilyPlayed,
    #[serde(rename = "DMG")]
    Damaged,
}

/// All condition grades, best first.
pub const ALL_CONDITIONS: [Condition; 5] = [
    Condition::NearMint,
    Condition::LightlyPlayed,
    Condition::ModeratelyPlayed,
    Condition::HeavilyPlayed,
    Condition::Damaged,
];

impl Condition {
    /// Parse the stored grade code.
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "NM" => Some(Self::NearMint),
            "LP" => Some(Self::LightlyPlayed),
            "MP" => Some(Self::ModeratelyPlayed),
            "HP" => Some(Self::HeavilyPlayed),
            "DMG" => Some(Self::Damaged),
            _ => None,
        }
    }

    /// Grade code used in storage and on the wire.
    pub fn as_code(self) -> &'static str {
        match self {
            Self::NearMint => "NM",
            Self::LightlyPlayed => "LP",
            Self::ModeratelyPlayed => "MP",
            Self::HeavilyPlayed => "HP",
            Self::Damaged => "DMG",
        }
    }
}

// ---------------------------------------------------------------------------
// Rarity
// ---------------------------------------------------------------------------

/// Print rarity within a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Mythic,
}

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

/// Deck construction format. Governs section templates, validation-rule
/// defaults, and gap-analysis thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Commander,
    Duel,
    Brawl,
    Standard,
    Modern,
    Pioneer,
    Legacy,
    Vintage,
    Pauper,
    Limited,
    Casual,
}

/// All supported formats.
pub const ALL_FORMATS: [Format; 11] = [
    Format::Commander,
    Format::Duel,
    Format::Brawl,
    Format::Standard,
    Format::Modern,
    Format::Pioneer,
    Format::Legacy,
    Format::Vintage,
    Format::Pauper,
    Format::Limited,
    Format::Casual,
];

impl Format {
    /// Parse the stored format name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "commander" => Some(Self::Commander),
            "duel" => Some(Self::Duel),
            "brawl" => Some(Self::Brawl),
            "standard" => Some(Self::Standard),
            "modern" => Some(Self::Modern),
            "pioneer" => Some(Self::Pioneer),
            "legacy" => Some(Self::Legacy),
            "vintage" => Some(Self::Vintage),
            "pauper" => Some(Self::Pauper),
            "limited" => Some(Self::Limited),
            "casual" => Some(Self::Casual),
            _ => None,
        }
    }

    /// Format name used in storage, legality keys, and on the wire.
    pub fn as_name(self) -> &'static str {
        match self {
            Self::Commander => "commander",
            Self::Duel => "duel",
            Self::Brawl => "brawl",
            Self::Standard => "standard",
            Self::Modern => "modern",
            Self::Pioneer => "pioneer",
            Self::Legacy => "legacy",
            Self::Vintage => "vintage",
            Self::Pauper => "pauper",
            Self::Limited => "limited",
            Self::Casual => "casual",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_name())
    }
}

// ---------------------------------------------------------------------------
// Legality
// ---------------------------------------------------------------------------

/// A card's legality in one format, as recorded in the catalog's
/// `legalities` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegalityStatus {
    Legal,
    NotLegal,
    Restricted,
    Banned,
}

impl LegalityStatus {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "legal" => Some(Self::Legal),
            "not_legal" => Some(Self::NotLegal),
            "restricted" => Some(Self::Restricted),
            "banned" => Some(Self::Banned),
            _ => None,
        }
    }

    /// Whether at least one copy may be played in the format.
    pub fn is_playable(self) -> bool {
        matches!(self, Self::Legal | Self::Restricted)
    }
}

/// Look up a card's legality for `format` in its stored legalities object.
/// Missing or unrecognized entries are not legal.
pub fn legality_for(legalities: &serde_json::Value, format: Format) -> LegalityStatus {
    legalities
        .get(format.as_name())
        .and_then(|v| v.as_str())
        .and_then(LegalityStatus::from_name)
        .unwrap_or(LegalityStatus::NotLegal)
}

// ---------------------------------------------------------------------------
// Type line classification
// ---------------------------------------------------------------------------

/// Primary-type vocabulary, in classification precedence order. A type line
/// naming several of these (e.g. "Artifact Creature") classifies as the
/// first match.
pub const PRIMARY_TYPES: [&str; 8] = [
    "Creature",
    "Planeswalker",
    "Battle",
    "Land",
    "Instant",
    "Sorcery",
    "Artifact",
    "Enchantment",
];

/// Classification bucket for type lines outside the fixed vocabulary.
pub const TYPE_OTHER: &str = "other";

/// The supertype segment of a type line: everything before the em-dash (or
/// ASCII " - ") that separates it from subtypes.
fn supertype_segment(type_line: &str) -> &str {
    if let Some((head, _)) = type_line.split_once('\u{2014}') {
        head
    } else if let Some((head, _)) = type_line.split_once(" - ") {
        head
    } else {
        type_line
    }
}

/// Classify a type line into its primary type bucket (lowercase), or
/// [`TYPE_OTHER`] when no vocabulary word appears.
pub fn primary_type(type_line: &str) -> &'static str {
    let segment = supertype_segment(type_line);
    for candidate in PRIMARY_TYPES {
        if segment
            .split_whitespace()
            .any(|word| word.eq_ignore_ascii_case(candidate))
        {
            return match candidate {
                "Creature" => "creature",
                "Planeswalker" => "planeswalker",
                "Battle" => "battle",
                "Land" => "land",
                "Instant" => "instant",
                "Sorcery" => "sorcery",
                "Artifact" => "artifact",
                _ => "enchantment",
            };
        }
    }
    TYPE_OTHER
}

/// Whether the type line names a land (checked against the supertype
/// segment only, so subtypes like "Island" never match).
pub fn is_land(type_line: &str) -> bool {
    supertype_segment(type_line)
        .split_whitespace()
        .any(|word| word.eq_ignore_ascii_case("Land"))
}

/// Whether the type line names a basic land. Basic lands are exempt from
/// singleton enforcement.
pub fn is_basic_land(type_line: &str) -> bool {
    let segment = supertype_segment(type_line);
    let has = |w: &str| {
        segment
            .split_whitespace()
            .any(|word| word.eq_ignore_ascii_case(w))
    };
    has("Basic") && has("Land")
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

/// Price display/valuation currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Usd,
    Eur,
}

impl Currency {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "usd" => Some(Self::Usd),
            "eur" => Some(Self::Eur),
            _ => None,
        }
    }

    pub fn as_name(self) -> &'static str {
        match self {
            Self::Usd => "usd",
            Self::Eur => "eur",
        }
    }
}

/// Market prices of one print, kept as the catalog's decimal strings.
/// Absent data is `None`, which is distinct from a known zero price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintPrices {
    pub usd: Option<String>,
    pub usd_foil: Option<String>,
    pub eur: Option<String>,
    pub eur_foil: Option<String>,
}

impl PrintPrices {
    /// Best available price in `currency`. Prefers the foil price when
    /// `prefer_foil` is set (foil-only prints, foil collection entries),
    /// falling back to whichever side has data.
    pub fn best(&self, currency: Currency, prefer_foil: bool) -> Option<f64> {
        let (plain, foil) = match currency {
            Currency::Usd => (&self.usd, &self.usd_foil),
            Currency::Eur => (&self.eur, &self.eur_foil),
        };
        let (first, second) = if prefer_foil { (foil, plain) } else { (plain, foil) };
        first
            .as_deref()
            .and_then(parse_price)
            .or_else(|| second.as_deref().and_then(parse_price))
    }
}

/// Parse a catalog price string. Empty or malformed values yield `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- color parsing --

    #[test]
    fn color_letter_round_trip() {
        for color in ALL_COLORS {
            assert_eq!(Color::from_letter(color.as_letter()), Some(color));
        }
    }

    #[test]
    fn color_serializes_as_letter() {
        assert_eq!(serde_json::to_value(Color::Blue).unwrap(), json!("U"));
    }

    #[test]
    fn parse_colors_skips_unknown() {
        let raw = vec!["W".to_string(), "X".to_string(), "G".to_string()];
        assert_eq!(parse_colors(&raw), vec![Color::White, Color::Green]);
    }

    // -- condition / format / legality --

    #[test]
    fn condition_code_round_trip() {
        for condition in ALL_CONDITIONS {
            assert_eq!(Condition::from_code(condition.as_code()), Some(condition));
        }
    }

    #[test]
    fn format_name_round_trip() {
        for format in ALL_FORMATS {
            assert_eq!(Format::from_name(format.as_name()), Some(format));
        }
    }

    #[test]
    fn legality_lookup_defaults_to_not_legal() {
        let legalities = json!({"commander": "legal", "vintage": "restricted"});
        assert_eq!(
            legality_for(&legalities, Format::Commander),
            LegalityStatus::Legal
        );
        assert_eq!(
            legality_for(&legalities, Format::Vintage),
            LegalityStatus::Restricted
        );
        assert_eq!(
            legality_for(&legalities, Format::Standard),
            LegalityStatus::NotLegal
        );
    }

    #[test]
    fn restricted_is_playable_banned_is_not() {
        assert!(LegalityStatus::Restricted.is_playable());
        assert!(!LegalityStatus::Banned.is_playable());
        assert!(!LegalityStatus::NotLegal.is_playable());
    }

    // -- type line classification --

    #[test]
    fn primary_type_before_em_dash() {
        assert_eq!(primary_type("Creature \u{2014} Human Wizard"), "creature");
        assert_eq!(primary_type("Instant"), "instant");
    }

    #[test]
    fn artifact_creature_classifies_as_creature() {
        assert_eq!(primary_type("Artifact Creature \u{2014} Golem"), "creature");
    }

    #[test]
    fn enchantment_land_classifies_as_land() {
        assert_eq!(
            primary_type("Enchantment Land \u{2014} Urza's Saga"),
            "land"
        );
    }

    #[test]
    fn unknown_type_line_classifies_as_other() {
        assert_eq!(primary_type("Conspiracy"), TYPE_OTHER);
        assert_eq!(primary_type(""), TYPE_OTHER);
    }

    #[test]
    fn ascii_dash_separator_is_honored() {
        assert_eq!(primary_type("Creature - Elf Druid"), "creature");
    }

    #[test]
    fn subtype_land_does_not_leak_into_classification() {
        // "Island" after the dash must not classify a non-land as land.
        assert_eq!(primary_type("Creature \u{2014} Island Dweller"), "creature");
        assert!(!is_land("Creature \u{2014} Island Dweller"));
    }

    #[test]
    fn basic_land_detection() {
        assert!(is_basic_land("Basic Land \u{2014} Forest"));
        assert!(is_land("Basic Land \u{2014} Forest"));
        assert!(!is_basic_land("Land \u{2014} Gate"));
        assert!(!is_basic_land("Creature \u{2014} Basilisk"));
    }

    // -- prices --

    #[test]
    fn parse_price_accepts_decimal_strings() {
        assert_eq!(parse_price("12.99"), Some(12.99));
        assert_eq!(parse_price(" 0.05 "), Some(0.05));
    }

    #[test]
    fn parse_price_rejects_empty_and_malformed() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("n/a"), None);
        assert_eq!(parse_price("-1.00"), None);
    }

    #[test]
    fn best_price_prefers_requested_side() {
        let prices = PrintPrices {
            usd: Some("1.00".into()),
            usd_foil: Some("5.00".into()),
            eur: None,
            eur_foil: None,
        };
        assert_eq!(prices.best(Currency::Usd, false), Some(1.00));
        assert_eq!(prices.best(Currency::Usd, true), Some(5.00));
    }

    #[test]
    fn best_price_falls_back_to_other_side() {
        let foil_only = PrintPrices {
            usd: None,
            usd_foil: Some("7.50".into()),
            eur: None,
            eur_foil: None,
        };
        assert_eq!(foil_only.best(Currency::Usd, false), Some(7.50));
        assert_eq!(foil_only.best(Currency::Eur, false), None);
    }
}
