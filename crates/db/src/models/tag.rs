//! Tag model and DTOs. Tags are user-scoped and typed; the same name may
//! exist once per type per user.

use deckforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Valid tag types.
pub const TAG_TYPES: [&str; 3] = ["deck", "collection", "card"];

/// A row from the `tags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub tag_type: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTag {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub tag_type: String,
}

/// DTO for updating a tag. The type is immutable after creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTag {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}
