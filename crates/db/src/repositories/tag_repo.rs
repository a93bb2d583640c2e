//! Repository for the `tags` table and its association tables.
//!
//! Tags are user-scoped and typed (`deck`, `collection`, `card`); the same
//! name may exist once per type per user (`uq_tags_user_name_type`).

use deckforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::tag::{CreateTag, Tag, UpdateTag};

/// Column list for `tags` queries.
const TAG_COLUMNS: &str = "\
    id, user_id, name, description, color, tag_type, created_at, updated_at";

/// Provides CRUD operations for tags.
pub struct TagRepo;

impl TagRepo {
    /// Create a tag.
    pub async fn create(pool: &PgPool, user_id: DbId, tag: &CreateTag) -> Result<Tag, sqlx::Error> {
        let query = format!(
            "INSERT INTO tags (user_id, name, description, color, tag_type) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {TAG_COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(user_id)
            .bind(&tag.name)
            .bind(tag.description.as_deref())
            .bind(tag.color.as_deref())
            .bind(&tag.tag_type)
            .fetch_one(pool)
            .await
    }

    /// Find a tag by ID, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's tags, optionally filtered by type, name-ordered.
    pub async fn list(
        pool: &PgPool,
        user_id: DbId,
        tag_type: Option<&str>,
    ) -> Result<Vec<Tag>, sqlx::Error> {
        match tag_type {
            Some(tag_type) => {
                let query = format!(
                    "SELECT {TAG_COLUMNS} FROM tags \
                     WHERE user_id = $1 AND tag_type = $2 ORDER BY name"
                );
                sqlx::query_as::<_, Tag>(&query)
                    .bind(user_id)
                    .bind(tag_type)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {TAG_COLUMNS} FROM tags WHERE user_id = $1 ORDER BY tag_type, name"
                );
                sqlx::query_as::<_, Tag>(&query)
                    .bind(user_id)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Resolve a set of tag ids owned by the user. Used by bulk operations
    /// to reject requests naming foreign or missing tags.
    pub async fn resolve_ids(
        pool: &PgPool,
        user_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM tags WHERE user_id = $1 AND id = ANY($2)",
        )
        .bind(user_id)
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Update a tag. The type is immutable after creation; omitted fields
    /// keep their value.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        update: &UpdateTag,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!(
            "UPDATE tags SET \
                name = COALESCE($3, name), \
                description = COALESCE($4, description), \
                color = COALESCE($5, color) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {TAG_COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .bind(user_id)
            .bind(update.name.as_deref())
            .bind(update.description.as_deref())
            .bind(update.color.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Delete a tag. Associations cascade; tagged entries and decks are
    /// untouched.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Tags attached to one collection entry.
    pub async fn for_entry(pool: &PgPool, entry_id: DbId) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!(
            "SELECT {TAG_COLUMNS} FROM tags t \
             JOIN collection_entry_tags et ON et.tag_id = t.id \
             WHERE et.entry_id = $1 ORDER BY t.name"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(entry_id)
            .fetch_all(pool)
            .await
    }

    /// Tags attached to one deck.
    pub async fn for_deck(pool: &PgPool, deck_id: DbId) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!(
            "SELECT {TAG_COLUMNS} FROM tags t \
             JOIN deck_tags dt ON dt.tag_id = t.id \
             WHERE dt.deck_id = $1 ORDER BY t.name"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(deck_id)
            .fetch_all(pool)
            .await
    }
}
