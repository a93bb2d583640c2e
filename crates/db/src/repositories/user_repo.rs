//! Repository for the `users` and `user_preferences` tables.

use deckforge_core::merge::{CollectionViewConfig, NotificationPreferences};
use deckforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{UpdatePreferences, UpdateUser, User, UserPreferences};
use crate::DbError;

/// Column list for `users` queries.
const USER_COLUMNS: &str = "\
    id, username, email, display_name, avatar_url, created_at, updated_at";

/// Column list for `user_preferences` queries.
const PREFERENCE_COLUMNS: &str = "\
    id, user_id, language, default_currency, theme, default_print_selection, \
    collection_view_config, notification_preferences, created_at, updated_at";

/// Provides read and update operations for users and their preferences.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a user's profile fields. Omitted fields keep their value.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        update: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET \
                username = COALESCE($2, username), \
                email = COALESCE($3, email), \
                display_name = COALESCE($4, display_name), \
                avatar_url = COALESCE($5, avatar_url) \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(update.username.as_deref())
            .bind(update.email.as_deref())
            .bind(update.display_name.as_deref())
            .bind(update.avatar_url.as_deref())
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Preferences
    // -----------------------------------------------------------------------

    /// Load a user's preferences, creating the default row on first access.
    pub async fn get_or_init_preferences(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<UserPreferences, sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_preferences (user_id) VALUES ($1) \
             ON CONFLICT ON CONSTRAINT uq_user_preferences_user DO NOTHING",
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        let query =
            format!("SELECT {PREFERENCE_COLUMNS} FROM user_preferences WHERE user_id = $1");
        sqlx::query_as::<_, UserPreferences>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Update preferences. Scalar fields replace their stored value; the
    /// nested view and notification configs are merged field-wise, so a
    /// partial patch never clobbers the fields it omits.
    pub async fn update_preferences(
        pool: &PgPool,
        user_id: DbId,
        update: &UpdatePreferences,
    ) -> Result<UserPreferences, DbError> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {PREFERENCE_COLUMNS} FROM user_preferences \
             WHERE user_id = $1 FOR UPDATE"
        );
        let current = sqlx::query_as::<_, UserPreferences>(&query)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(deckforge_core::error::CoreError::NotFound {
                entity: "UserPreferences",
                id: user_id,
            })?;

        // Malformed stored configs read as defaults rather than failing the
        // update.
        let mut view_config: CollectionViewConfig =
            serde_json::from_value(current.collection_view_config.clone()).unwrap_or_default();
        if let Some(patch) = update.collection_view_config.clone() {
            view_config.merge(patch);
        }
        let mut notifications: NotificationPreferences =
            serde_json::from_value(current.notification_preferences.clone()).unwrap_or_default();
        if let Some(patch) = update.notification_preferences.clone() {
            notifications.merge(patch);
        }

        let view_json = serde_json::to_value(&view_config)
            .map_err(|e| deckforge_core::error::CoreError::Validation(e.to_string()))?;
        let notification_json = serde_json::to_value(&notifications)
            .map_err(|e| deckforge_core::error::CoreError::Validation(e.to_string()))?;

        let query = format!(
            "UPDATE user_preferences SET \
                language = COALESCE($2, language), \
                default_currency = COALESCE($3, default_currency), \
                theme = COALESCE($4, theme), \
                default_print_selection = COALESCE($5, default_print_selection), \
                collection_view_config = $6, \
                notification_preferences = $7 \
             WHERE user_id = $1 \
             RETURNING {PREFERENCE_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, UserPreferences>(&query)
            .bind(user_id)
            .bind(update.language.as_deref())
            .bind(update.default_currency.as_deref())
            .bind(update.theme.as_deref())
            .bind(update.default_print_selection.as_deref())
            .bind(view_json)
            .bind(notification_json)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    // Exercises the borrowed-patch call path without a live database; the
    // lazy pool fails at acquire time and the error propagates.
    #[tokio::test]
    async fn preference_update_surfaces_pool_errors() {
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(100))
            .connect_lazy("postgres://127.0.0.1:1/deckforge")
            .unwrap();
        let update = UpdatePreferences {
            language: Some("fr".to_string()),
            ..UpdatePreferences::default()
        };
        let result = UserRepo::update_preferences(&pool, 1, &update).await;
        assert!(result.is_err());
    }
}
