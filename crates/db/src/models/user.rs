//! User and user-preference models and DTOs.

use deckforge_core::merge::{CollectionViewConfigPatch, NotificationPreferencesPatch};
use deckforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for updating a user. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A row from the `user_preferences` table. The nested JSON configs are kept
/// as raw values here; the handler layer parses them into their typed shapes
/// for merging.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub id: DbId,
    pub user_id: DbId,
    pub language: String,
    pub default_currency: String,
    pub theme: String,
    pub default_print_selection: String,
    pub collection_view_config: serde_json::Value,
    pub notification_preferences: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for updating preferences. Scalars replace; the nested configs are
/// typed partial patches merged into the stored objects.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferences {
    pub language: Option<String>,
    pub default_currency: Option<String>,
    pub theme: Option<String>,
    pub default_print_selection: Option<String>,
    pub collection_view_config: Option<CollectionViewConfigPatch>,
    pub notification_preferences: Option<NotificationPreferencesPatch>,
}
