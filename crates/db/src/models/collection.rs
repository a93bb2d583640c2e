//! Collection entry models and DTOs.
//!
//! Entries are unique per natural key `(user_id, card_print_id, is_foil,
//! condition)`; an additive add against an existing key increments quantity
//! and leaves every other field untouched.

use chrono::NaiveDate;
use deckforge_core::merge::SortDirection;
use deckforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

/// Maximum length of the free-form notes field.
pub const MAX_NOTES_LENGTH: usize = 1000;

fn default_quantity() -> i32 {
    1
}

/// A row from the `collection_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub folder_id: Option<DbId>,
    pub card_print_id: DbId,
    pub quantity: i32,
    pub condition: String,
    pub is_foil: bool,
    pub acquired_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub custom_fields: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding cards to the collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCollection {
    pub card_print_id: DbId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub condition: String,
    #[serde(default)]
    pub is_foil: bool,
    pub folder_id: Option<DbId>,
    pub acquired_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub custom_fields: Option<serde_json::Value>,
    pub tag_ids: Option<Vec<DbId>>,
}

/// DTO for removing copies. Removing more than owned deletes the entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCollection {
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

/// DTO for updating an entry. Supplied scalar fields replace the stored
/// value; `custom_fields` and `tag_ids` replace the whole prior set.
/// Nullable fields are cleared by an explicit `null` inside `Some`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCollectionEntry {
    pub quantity: Option<i32>,
    pub condition: Option<String>,
    pub is_foil: Option<bool>,
    #[serde(default, deserialize_with = "crate::models::explicit_null")]
    pub folder_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "crate::models::explicit_null")]
    pub acquired_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "crate::models::explicit_null")]
    pub notes: Option<Option<String>>,
    pub custom_fields: Option<serde_json::Value>,
    pub tag_ids: Option<Vec<DbId>>,
}

/// DTO for moving entries between folders (`null` folder = unfiled).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMoveToFolder {
    pub entry_ids: Vec<DbId>,
    pub folder_id: Option<DbId>,
}

/// DTO for applying tags to many entries at once.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAddTags {
    pub entry_ids: Vec<DbId>,
    pub tag_ids: Vec<DbId>,
}

/// Sortable fields for collection listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionSortBy {
    Name,
    AcquiredDate,
    Quantity,
    Price,
    SetCode,
    CreatedAt,
    Condition,
}

/// Query parameters for collection listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionListParams {
    /// Partial card-name match.
    pub search: Option<String>,
    /// Folder filter; `unfiled` selects entries with no folder.
    pub folder_id: Option<String>,
    pub condition: Option<String>,
    pub is_foil: Option<bool>,
    pub set_code: Option<String>,
    /// Entries must carry ALL of these tags.
    pub tag_ids: Option<Vec<DbId>>,
    pub sort_by: Option<CollectionSortBy>,
    pub sort_direction: Option<SortDirection>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Aggregated collection statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    /// Distinct rules identities.
    pub unique_cards: i64,
    pub total_cards: i64,
    pub total_value_usd: Option<f64>,
    pub total_value_eur: Option<f64>,
    pub foil_count: i64,
    pub by_condition: BTreeMap<String, i64>,
    pub by_folder: BTreeMap<String, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_defaults_quantity_to_one() {
        let add: AddToCollection =
            serde_json::from_str(r#"{"cardPrintId": 12, "condition": "NM"}"#).unwrap();
        assert_eq!(add.quantity, 1);
        assert!(!add.is_foil);
        assert_eq!(add.folder_id, None);
    }

    #[test]
    fn remove_defaults_quantity_to_one() {
        let remove: RemoveFromCollection = serde_json::from_str("{}").unwrap();
        assert_eq!(remove.quantity, 1);
    }
}
