//! Deck, section, and deck-card models and DTOs.

use deckforge_core::composition::SectionRules;
use deckforge_core::merge::SortDirection;
use deckforge_core::ownership::CardOwnership;
use deckforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `decks` table. `version` increments on every
/// composition-changing mutation and gates cached recommendations.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub format: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub public_slug: Option<String>,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a deck. Sections are instantiated from the format's
/// template.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeck {
    pub name: String,
    pub format: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    pub tag_ids: Option<Vec<DbId>>,
}

/// DTO for updating a deck. `tag_ids`, when supplied, replaces the set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeck {
    pub name: Option<String>,
    pub format: Option<String>,
    #[serde(default, deserialize_with = "crate::models::explicit_null")]
    pub description: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub tag_ids: Option<Vec<DbId>>,
}

/// DTO for cloning a deck.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneDeck {
    pub name: String,
    #[serde(default)]
    pub include_tags: bool,
}

/// Query parameters for deck listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckListParams {
    pub search: Option<String>,
    pub format: Option<String>,
    pub is_public: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// A row from the `deck_sections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSection {
    pub id: DbId,
    pub deck_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub position: i32,
    pub validation_rules: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DeckSection {
    /// Parse the stored validation rules. Absent or malformed rules read as
    /// "no rules enforced".
    pub fn rules(&self) -> SectionRules {
        self.validation_rules
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }
}

/// DTO for creating a section. Position defaults to end of deck.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSection {
    pub name: String,
    pub description: Option<String>,
    pub position: Option<i32>,
    pub validation_rules: Option<SectionRules>,
}

/// DTO for updating a section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSection {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::models::explicit_null")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::explicit_null")]
    pub validation_rules: Option<Option<SectionRules>>,
}

/// DTO for reordering sections within a deck.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderSections {
    pub section_ids: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Deck cards
// ---------------------------------------------------------------------------

/// A row from the `deck_cards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckCard {
    pub id: DbId,
    pub section_id: DbId,
    pub card_print_id: DbId,
    pub quantity: i32,
    pub position: i32,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a card to a section. Adding a print already in the section
/// merges quantities rather than duplicating the row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDeckCard {
    pub section_id: DbId,
    pub card_print_id: DbId,
    #[serde(default = "default_card_quantity")]
    pub quantity: i32,
    pub notes: Option<String>,
}

fn default_card_quantity() -> i32 {
    1
}

/// DTO for updating a deck card in place.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeckCard {
    pub quantity: Option<i32>,
    #[serde(default, deserialize_with = "crate::models::explicit_null")]
    pub notes: Option<Option<String>>,
}

/// DTO for moving a card to another section. Position defaults to the end
/// of the target section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDeckCard {
    pub target_section_id: DbId,
    pub position: Option<i32>,
}

/// DTO for reordering the cards of one section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderDeckCards {
    pub card_ids: Vec<DbId>,
}

/// DTO for adding several cards in one all-or-nothing unit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAddDeckCards {
    pub cards: Vec<AddDeckCard>,
}

/// A deck card joined to its print and rules identity, as loaded from the
/// database. Feeds statistics, validation, and the listing view.
#[derive(Debug, Clone, FromRow)]
pub struct DeckCardDetails {
    pub id: DbId,
    pub section_id: DbId,
    pub card_print_id: DbId,
    pub oracle_id: Uuid,
    pub name: String,
    pub mana_cost: Option<String>,
    pub type_line: String,
    pub oracle_text: Option<String>,
    pub colors: Vec<String>,
    pub cmc: f32,
    pub set_code: String,
    pub foil: bool,
    pub nonfoil: bool,
    pub price_usd: Option<String>,
    pub price_usd_foil: Option<String>,
    pub price_eur: Option<String>,
    pub price_eur_foil: Option<String>,
    pub quantity: i32,
    pub position: i32,
    pub notes: Option<String>,
}

impl DeckCardDetails {
    /// The shape the statistics aggregator consumes.
    pub fn to_resolved(&self) -> deckforge_core::stats::ResolvedDeckCard {
        deckforge_core::stats::ResolvedDeckCard {
            card_print_id: self.card_print_id,
            oracle_id: self.oracle_id,
            name: self.name.clone(),
            quantity: self.quantity,
            cmc: f64::from(self.cmc),
            colors: deckforge_core::card::parse_colors(&self.colors),
            type_line: self.type_line.clone(),
            oracle_text: self.oracle_text.clone(),
            prices: deckforge_core::card::PrintPrices {
                usd: self.price_usd.clone(),
                usd_foil: self.price_usd_foil.clone(),
                eur: self.price_eur.clone(),
                eur_foil: self.price_eur_foil.clone(),
            },
            foil_only: self.foil && !self.nonfoil,
        }
    }

    /// The listing view, with ownership figures attached.
    pub fn into_view(self, ownership: CardOwnership) -> DeckCardView {
        DeckCardView {
            id: self.id,
            section_id: self.section_id,
            card_print_id: self.card_print_id,
            oracle_id: self.oracle_id,
            name: self.name,
            mana_cost: self.mana_cost,
            type_line: self.type_line,
            set_code: self.set_code,
            quantity: self.quantity,
            position: self.position,
            notes: self.notes,
            ownership,
        }
    }
}

/// A deck card joined to its print and rules identity, with ownership
/// figures, as returned by deck card listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckCardView {
    pub id: DbId,
    pub section_id: DbId,
    pub card_print_id: DbId,
    pub oracle_id: Uuid,
    pub name: String,
    pub mana_cost: Option<String>,
    pub type_line: String,
    pub set_code: String,
    pub quantity: i32,
    pub position: i32,
    pub notes: Option<String>,
    pub ownership: CardOwnership,
}
