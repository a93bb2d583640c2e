//! Repository for the `decks` and `deck_sections` tables.
//!
//! Deck creation instantiates the format's section templates. `decks.version`
//! is bumped by every composition-affecting mutation (section rule changes
//! and deletions here, card mutations in `deck_card_repo`) and gates cached
//! recommendations at serve time.

use deckforge_core::card::Format;
use deckforge_core::composition::validate_reorder;
use deckforge_core::error::CoreError;
use deckforge_core::section_templates::templates_for;
use deckforge_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::deck::{
    CloneDeck, CreateDeck, Deck, DeckListParams, DeckSection, CreateSection, ReorderSections,
    UpdateDeck, UpdateSection,
};
use crate::DbError;

/// Column list for `decks` queries.
const DECK_COLUMNS: &str = "\
    id, user_id, name, format, description, is_public, public_slug, version, \
    created_at, updated_at";

/// Column list for `deck_sections` queries.
const SECTION_COLUMNS: &str = "\
    id, deck_id, name, description, position, validation_rules, created_at, \
    updated_at";

/// The same columns qualified for deck joins.
const QUALIFIED_SECTION_COLUMNS: &str = "\
    s.id, s.deck_id, s.name, s.description, s.position, s.validation_rules, \
    s.created_at, s.updated_at";

/// Provides CRUD operations for decks and their sections.
pub struct DeckRepo;

impl DeckRepo {
    // -----------------------------------------------------------------------
    // Decks
    // -----------------------------------------------------------------------

    /// Create a deck and instantiate its format's section templates.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        create: &CreateDeck,
    ) -> Result<Deck, DbError> {
        let format = parse_format(&create.format)?;

        let mut tx = pool.begin().await?;

        let public_slug = create.is_public.then(|| slugify(&create.name));
        let query = format!(
            "INSERT INTO decks (user_id, name, format, description, is_public, public_slug) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {DECK_COLUMNS}"
        );
        let deck = sqlx::query_as::<_, Deck>(&query)
            .bind(user_id)
            .bind(&create.name)
            .bind(format.as_name())
            .bind(create.description.as_deref())
            .bind(create.is_public)
            .bind(public_slug.as_deref())
            .fetch_one(&mut *tx)
            .await?;

        for (position, template) in templates_for(format).into_iter().enumerate() {
            let rules_json = template
                .rules
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| CoreError::Validation(e.to_string()))?;
            sqlx::query(
                "INSERT INTO deck_sections (deck_id, name, description, position, validation_rules) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(deck.id)
            .bind(template.name)
            .bind(template.description)
            .bind(position as i32)
            .bind(rules_json)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(tag_ids) = &create.tag_ids {
            apply_deck_tags(&mut tx, user_id, deck.id, tag_ids).await?;
        }

        tx.commit().await?;
        Ok(deck)
    }

    /// Find a deck by ID, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: DbId,
        deck_id: DbId,
    ) -> Result<Option<Deck>, sqlx::Error> {
        let query = format!("SELECT {DECK_COLUMNS} FROM decks WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Deck>(&query)
            .bind(deck_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's decks with optional filters.
    pub async fn list(
        pool: &PgPool,
        user_id: DbId,
        params: &DeckListParams,
    ) -> Result<Vec<Deck>, sqlx::Error> {
        let mut conditions = vec!["user_id = $1".to_string()];
        let mut arg = 1;
        let mut next = || {
            arg += 1;
            arg
        };

        if params.search.is_some() {
            conditions.push(format!("name ILIKE '%' || ${} || '%'", next()));
        }
        if params.format.is_some() {
            conditions.push(format!("format = ${}", next()));
        }
        if params.is_public.is_some() {
            conditions.push(format!("is_public = ${}", next()));
        }

        let direction = match params.sort_direction {
            Some(deckforge_core::merge::SortDirection::Desc) => "DESC",
            Some(deckforge_core::merge::SortDirection::Asc) => "ASC",
            None => "DESC",
        };
        let column = match params.sort_by.as_deref() {
            Some("name") => "name",
            Some("createdAt") => "created_at",
            _ => "updated_at",
        };

        let query = format!(
            "SELECT {DECK_COLUMNS} FROM decks WHERE {} \
             ORDER BY {column} {direction}, id {direction}",
            conditions.join(" AND ")
        );

        let mut q = sqlx::query_as::<_, Deck>(&query).bind(user_id);
        if let Some(search) = &params.search {
            q = q.bind(search);
        }
        if let Some(format) = &params.format {
            q = q.bind(format);
        }
        if let Some(is_public) = params.is_public {
            q = q.bind(is_public);
        }
        q.fetch_all(pool).await
    }

    /// Update deck metadata. Format strings are validated; making a deck
    /// public assigns a slug if it never had one. Metadata changes do not
    /// bump the version.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        deck_id: DbId,
        update: &UpdateDeck,
    ) -> Result<Deck, DbError> {
        if let Some(format) = &update.format {
            parse_format(format)?;
        }

        let mut tx = pool.begin().await?;

        let current = lock_deck(&mut tx, user_id, deck_id).await?;

        let description = match &update.description {
            Some(value) => value.clone(),
            None => current.description.clone(),
        };
        let is_public = update.is_public.unwrap_or(current.is_public);
        let public_slug = if is_public {
            current
                .public_slug
                .clone()
                .or_else(|| Some(slugify(update.name.as_deref().unwrap_or(&current.name))))
        } else {
            None
        };

        let query = format!(
            "UPDATE decks SET \
                name = COALESCE($3, name), \
                format = COALESCE($4, format), \
                description = $5, \
                is_public = $6, \
                public_slug = $7 \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {DECK_COLUMNS}"
        );
        let deck = sqlx::query_as::<_, Deck>(&query)
            .bind(deck_id)
            .bind(user_id)
            .bind(update.name.as_deref())
            .bind(update.format.as_deref())
            .bind(description.as_deref())
            .bind(is_public)
            .bind(public_slug.as_deref())
            .fetch_one(&mut *tx)
            .await?;

        if let Some(tag_ids) = &update.tag_ids {
            sqlx::query("DELETE FROM deck_tags WHERE deck_id = $1")
                .bind(deck_id)
                .execute(&mut *tx)
                .await?;
            apply_deck_tags(&mut tx, user_id, deck_id, tag_ids).await?;
        }

        tx.commit().await?;
        Ok(deck)
    }

    /// Delete a deck. Sections and cards cascade.
    pub async fn delete(pool: &PgPool, user_id: DbId, deck_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM decks WHERE id = $1 AND user_id = $2")
            .bind(deck_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clone a deck with all sections and cards. The clone starts private at
    /// version 1; tags copy only when requested.
    pub async fn clone(
        pool: &PgPool,
        user_id: DbId,
        deck_id: DbId,
        clone: &CloneDeck,
    ) -> Result<Deck, DbError> {
        let mut tx = pool.begin().await?;

        let source = lock_deck(&mut tx, user_id, deck_id).await?;

        let query = format!(
            "INSERT INTO decks (user_id, name, format, description) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {DECK_COLUMNS}"
        );
        let new_deck = sqlx::query_as::<_, Deck>(&query)
            .bind(user_id)
            .bind(&clone.name)
            .bind(&source.format)
            .bind(source.description.as_deref())
            .fetch_one(&mut *tx)
            .await?;

        // Copy sections and remember the id mapping for the card copy.
        let sections = sqlx::query_as::<_, DeckSection>(&format!(
            "SELECT {SECTION_COLUMNS} FROM deck_sections WHERE deck_id = $1 ORDER BY position"
        ))
        .bind(deck_id)
        .fetch_all(&mut *tx)
        .await?;

        for section in &sections {
            let new_section_id = sqlx::query_scalar::<_, DbId>(
                "INSERT INTO deck_sections (deck_id, name, description, position, validation_rules) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING id",
            )
            .bind(new_deck.id)
            .bind(&section.name)
            .bind(section.description.as_deref())
            .bind(section.position)
            .bind(section.validation_rules.as_ref())
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO deck_cards (section_id, card_print_id, quantity, position, notes) \
                 SELECT $1, card_print_id, quantity, position, notes \
                 FROM deck_cards WHERE section_id = $2",
            )
            .bind(new_section_id)
            .bind(section.id)
            .execute(&mut *tx)
            .await?;
        }

        if clone.include_tags {
            sqlx::query(
                "INSERT INTO deck_tags (deck_id, tag_id) \
                 SELECT $1, tag_id FROM deck_tags WHERE deck_id = $2",
            )
            .bind(new_deck.id)
            .bind(deck_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(new_deck)
    }

    // -----------------------------------------------------------------------
    // Sections
    // -----------------------------------------------------------------------

    /// List a deck's sections in position order.
    pub async fn list_sections(
        pool: &PgPool,
        deck_id: DbId,
    ) -> Result<Vec<DeckSection>, sqlx::Error> {
        let query = format!(
            "SELECT {SECTION_COLUMNS} FROM deck_sections \
             WHERE deck_id = $1 ORDER BY position"
        );
        sqlx::query_as::<_, DeckSection>(&query)
            .bind(deck_id)
            .fetch_all(pool)
            .await
    }

    /// Create a section. Position defaults to the end of the deck.
    pub async fn create_section(
        pool: &PgPool,
        user_id: DbId,
        deck_id: DbId,
        create: &CreateSection,
    ) -> Result<DeckSection, DbError> {
        let mut tx = pool.begin().await?;
        lock_deck(&mut tx, user_id, deck_id).await?;

        let position = match create.position {
            Some(position) => position,
            None => {
                sqlx::query_scalar::<_, i32>(
                    "SELECT COALESCE(MAX(position) + 1, 0) FROM deck_sections WHERE deck_id = $1",
                )
                .bind(deck_id)
                .fetch_one(&mut *tx)
                .await?
            }
        };
        let rules_json = create
            .validation_rules
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        let query = format!(
            "INSERT INTO deck_sections (deck_id, name, description, position, validation_rules) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {SECTION_COLUMNS}"
        );
        let section = sqlx::query_as::<_, DeckSection>(&query)
            .bind(deck_id)
            .bind(&create.name)
            .bind(create.description.as_deref())
            .bind(position)
            .bind(rules_json)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(section)
    }

    /// Update a section. A rule change affects what validation permits, so
    /// it bumps the deck version.
    pub async fn update_section(
        pool: &PgPool,
        user_id: DbId,
        section_id: DbId,
        update: &UpdateSection,
    ) -> Result<DeckSection, DbError> {
        let mut tx = pool.begin().await?;

        let current = find_section_for_user(&mut tx, user_id, section_id).await?;
        lock_deck(&mut tx, user_id, current.deck_id).await?;

        let description = match &update.description {
            Some(value) => value.clone(),
            None => current.description.clone(),
        };
        let rules_changed = update.validation_rules.is_some();
        let rules_json = match &update.validation_rules {
            Some(Some(rules)) => {
                Some(serde_json::to_value(rules).map_err(|e| CoreError::Validation(e.to_string()))?)
            }
            Some(None) => None,
            None => current.validation_rules.clone(),
        };

        let query = format!(
            "UPDATE deck_sections SET \
                name = COALESCE($2, name), \
                description = $3, \
                validation_rules = $4 \
             WHERE id = $1 \
             RETURNING {SECTION_COLUMNS}"
        );
        let section = sqlx::query_as::<_, DeckSection>(&query)
            .bind(section_id)
            .bind(update.name.as_deref())
            .bind(description.as_deref())
            .bind(rules_json.as_ref())
            .fetch_one(&mut *tx)
            .await?;

        if rules_changed {
            bump_version(&mut tx, current.deck_id).await?;
        }

        tx.commit().await?;
        Ok(section)
    }

    /// Delete a section. Its cards cascade, which changes composition, so
    /// the deck version bumps.
    pub async fn delete_section(
        pool: &PgPool,
        user_id: DbId,
        section_id: DbId,
    ) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;

        let section = find_section_for_user(&mut tx, user_id, section_id).await?;
        lock_deck(&mut tx, user_id, section.deck_id).await?;

        sqlx::query("DELETE FROM deck_sections WHERE id = $1")
            .bind(section_id)
            .execute(&mut *tx)
            .await?;
        bump_version(&mut tx, section.deck_id).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Reorder a deck's sections. The supplied ids must be exactly the
    /// current membership; positions 0..n-1 are assigned in request order.
    pub async fn reorder_sections(
        pool: &PgPool,
        user_id: DbId,
        deck_id: DbId,
        reorder: &ReorderSections,
    ) -> Result<Vec<DeckSection>, DbError> {
        let mut tx = pool.begin().await?;
        lock_deck(&mut tx, user_id, deck_id).await?;

        let current_ids = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM deck_sections WHERE deck_id = $1 ORDER BY position",
        )
        .bind(deck_id)
        .fetch_all(&mut *tx)
        .await?;
        validate_reorder(&current_ids, &reorder.section_ids)?;

        for (position, section_id) in reorder.section_ids.iter().enumerate() {
            sqlx::query("UPDATE deck_sections SET position = $2 WHERE id = $1")
                .bind(section_id)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        let query = format!(
            "SELECT {SECTION_COLUMNS} FROM deck_sections \
             WHERE deck_id = $1 ORDER BY position"
        );
        let sections = sqlx::query_as::<_, DeckSection>(&query)
            .bind(deck_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(sections)
    }
}

/// Lock the deck row for the duration of a composition transaction,
/// verifying ownership. Concurrent mutations of the same deck serialize
/// here.
pub(crate) async fn lock_deck(
    tx: &mut Transaction<'_, Postgres>,
    user_id: DbId,
    deck_id: DbId,
) -> Result<Deck, DbError> {
    let query = format!(
        "SELECT {DECK_COLUMNS} FROM decks WHERE id = $1 AND user_id = $2 FOR UPDATE"
    );
    let deck = sqlx::query_as::<_, Deck>(&query)
        .bind(deck_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Deck",
            id: deck_id,
        })?;
    Ok(deck)
}

/// Bump the deck version inside a composition transaction.
pub(crate) async fn bump_version(
    tx: &mut Transaction<'_, Postgres>,
    deck_id: DbId,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE decks SET version = version + 1 WHERE id = $1")
        .bind(deck_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Resolve a section to one owned by this user.
pub(crate) async fn find_section_for_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: DbId,
    section_id: DbId,
) -> Result<DeckSection, DbError> {
    let query = format!(
        "SELECT {QUALIFIED_SECTION_COLUMNS} FROM deck_sections s \
         JOIN decks d ON d.id = s.deck_id \
         WHERE s.id = $1 AND d.user_id = $2"
    );
    sqlx::query_as::<_, DeckSection>(&query)
        .bind(section_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "DeckSection",
                id: section_id,
            }
            .into()
        })
}

/// Attach tags to a deck, rejecting foreign or missing tag ids.
async fn apply_deck_tags(
    tx: &mut Transaction<'_, Postgres>,
    user_id: DbId,
    deck_id: DbId,
    tag_ids: &[DbId],
) -> Result<(), DbError> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let found = sqlx::query_scalar::<_, DbId>(
        "SELECT id FROM tags WHERE user_id = $1 AND id = ANY($2)",
    )
    .bind(user_id)
    .bind(tag_ids)
    .fetch_all(&mut **tx)
    .await?;
    let missing: Vec<DbId> = tag_ids
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::PartialFailure {
            entity: "Tag",
            failed_ids: missing,
        }
        .into());
    }

    sqlx::query(
        "INSERT INTO deck_tags (deck_id, tag_id) \
         SELECT $1, unnest($2::bigint[]) \
         ON CONFLICT DO NOTHING",
    )
    .bind(deck_id)
    .bind(tag_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn parse_format(raw: &str) -> Result<Format, CoreError> {
    Format::from_name(raw).ok_or_else(|| CoreError::Validation(format!("unknown format '{raw}'")))
}

/// Lowercase, alphanumeric-and-hyphen slug with a random suffix so public
/// URLs stay unique across same-named decks.
fn slugify(name: &str) -> String {
    let base: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let base = base.trim_matches('-').to_string();
    let suffix = &uuid::Uuid::new_v4().simple().to_string()[..8];
    if base.is_empty() {
        format!("deck-{suffix}")
    } else {
        format!("{base}-{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugs_are_url_safe_and_unique() {
        let a = slugify("My Mono-Red Burn!");
        let b = slugify("My Mono-Red Burn!");
        assert!(a.starts_with("my-mono-red-burn"));
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }

    #[test]
    fn empty_name_still_slugs() {
        let slug = slugify("!!!");
        assert!(slug.starts_with("deck-"));
    }
}
