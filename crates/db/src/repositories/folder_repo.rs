//! Repository for the `collection_folders` table.
//!
//! Folder deletion unfiles its entries (the FK is `ON DELETE SET NULL`);
//! cards are never deleted through a folder.

use deckforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::folder::{CollectionFolder, CreateFolder, UpdateFolder};

/// Column list for `collection_folders` queries.
const FOLDER_COLUMNS: &str = "\
    id, user_id, name, description, color, created_at, updated_at";

/// Provides CRUD operations for collection folders.
pub struct FolderRepo;

impl FolderRepo {
    /// Create a folder. Duplicate names per user surface as constraint
    /// violations (`uq_folders_user_name`).
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        folder: &CreateFolder,
    ) -> Result<CollectionFolder, sqlx::Error> {
        let query = format!(
            "INSERT INTO collection_folders (user_id, name, description, color) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {FOLDER_COLUMNS}"
        );
        sqlx::query_as::<_, CollectionFolder>(&query)
            .bind(user_id)
            .bind(&folder.name)
            .bind(folder.description.as_deref())
            .bind(folder.color.as_deref())
            .fetch_one(pool)
            .await
    }

    /// Find a folder by ID, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<CollectionFolder>, sqlx::Error> {
        let query = format!(
            "SELECT {FOLDER_COLUMNS} FROM collection_folders \
             WHERE id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, CollectionFolder>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's folders, name-ordered.
    pub async fn list(pool: &PgPool, user_id: DbId) -> Result<Vec<CollectionFolder>, sqlx::Error> {
        let query = format!(
            "SELECT {FOLDER_COLUMNS} FROM collection_folders \
             WHERE user_id = $1 ORDER BY name"
        );
        sqlx::query_as::<_, CollectionFolder>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a folder. Omitted fields keep their value.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        update: &UpdateFolder,
    ) -> Result<Option<CollectionFolder>, sqlx::Error> {
        let query = format!(
            "UPDATE collection_folders SET \
                name = COALESCE($3, name), \
                description = COALESCE($4, description), \
                color = COALESCE($5, color) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {FOLDER_COLUMNS}"
        );
        sqlx::query_as::<_, CollectionFolder>(&query)
            .bind(id)
            .bind(user_id)
            .bind(update.name.as_deref())
            .bind(update.description.as_deref())
            .bind(update.color.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Delete a folder. Returns whether a row was deleted. Entries filed in
    /// the folder become unfiled.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM collection_folders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
