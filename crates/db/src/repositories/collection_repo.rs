//! Repository for the `collection_entries` table.
//!
//! Entries are unique per `(user_id, card_print_id, is_foil, condition)`.
//! Adds against an existing key increment quantity; removes clamp at zero by
//! deleting the row. Bulk operations are all-or-nothing: one bad id rejects
//! the whole request before any row is touched.

use std::collections::BTreeMap;

use deckforge_core::card::{Condition, Currency};
use deckforge_core::error::CoreError;
use deckforge_core::types::DbId;
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use crate::models::collection::{
    AddToCollection, BulkAddTags, BulkMoveToFolder, CollectionEntry, CollectionListParams,
    CollectionSortBy, CollectionStats, RemoveFromCollection, UpdateCollectionEntry,
    MAX_NOTES_LENGTH,
};
use crate::DbError;

/// Column list for `collection_entries` queries.
const ENTRY_COLUMNS: &str = "\
    id, user_id, folder_id, card_print_id, quantity, condition, is_foil, \
    acquired_date, notes, custom_fields, created_at, updated_at";

/// The same columns qualified for catalog joins.
const QUALIFIED_ENTRY_COLUMNS: &str = "\
    ce.id, ce.user_id, ce.folder_id, ce.card_print_id, ce.quantity, \
    ce.condition, ce.is_foil, ce.acquired_date, ce.notes, ce.custom_fields, \
    ce.created_at, ce.updated_at";

/// Default page size for collection listing.
const DEFAULT_LIMIT: i64 = 100;

/// Maximum page size for collection listing.
const MAX_LIMIT: i64 = 500;

/// Provides mutation and query operations for the collection.
pub struct CollectionRepo;

impl CollectionRepo {
    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Add copies of a print. An existing entry with the same natural key
    /// gains quantity and keeps every other field; otherwise a new entry is
    /// created with the supplied fields.
    pub async fn add(
        pool: &PgPool,
        user_id: DbId,
        add: &AddToCollection,
    ) -> Result<CollectionEntry, DbError> {
        validate_quantity(add.quantity)?;
        validate_condition(&add.condition)?;
        validate_notes(add.notes.as_deref())?;

        let mut tx = pool.begin().await?;

        let print_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM card_prints WHERE id = $1)")
                .bind(add.card_print_id)
                .fetch_one(&mut *tx)
                .await?;
        if !print_exists {
            return Err(CoreError::NotFound {
                entity: "CardPrint",
                id: add.card_print_id,
            }
            .into());
        }

        // xmax = 0 distinguishes a fresh insert from the DO UPDATE branch.
        let query = format!(
            "INSERT INTO collection_entries \
                (user_id, card_print_id, folder_id, quantity, condition, is_foil, \
                 acquired_date, notes, custom_fields) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT ON CONSTRAINT uq_entries_natural_key \
             DO UPDATE SET quantity = collection_entries.quantity + EXCLUDED.quantity \
             RETURNING {ENTRY_COLUMNS}, (xmax = 0) AS inserted"
        );
        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(add.card_print_id)
            .bind(add.folder_id)
            .bind(add.quantity)
            .bind(&add.condition)
            .bind(add.is_foil)
            .bind(add.acquired_date)
            .bind(add.notes.as_deref())
            .bind(add.custom_fields.as_ref())
            .fetch_one(&mut *tx)
            .await?;
        let inserted: bool = row.try_get("inserted")?;
        let entry = CollectionEntry::from_row(&row)?;

        if let Some(tag_ids) = tags_for_new_entry(inserted, add.tag_ids.as_deref()) {
            apply_tags(&mut tx, user_id, entry.id, tag_ids).await?;
        }

        tx.commit().await?;
        Ok(entry)
    }

    /// Remove copies. Removing at least the owned quantity deletes the
    /// entry; the result is `None` when the entry is gone.
    pub async fn remove(
        pool: &PgPool,
        user_id: DbId,
        entry_id: DbId,
        remove: &RemoveFromCollection,
    ) -> Result<Option<CollectionEntry>, DbError> {
        validate_quantity(remove.quantity)?;

        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM collection_entries \
             WHERE id = $1 AND user_id = $2 FOR UPDATE"
        );
        let entry = sqlx::query_as::<_, CollectionEntry>(&query)
            .bind(entry_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "CollectionEntry",
                id: entry_id,
            })?;

        let result = if remove.quantity >= entry.quantity {
            sqlx::query("DELETE FROM collection_entries WHERE id = $1")
                .bind(entry_id)
                .execute(&mut *tx)
                .await?;
            None
        } else {
            let query = format!(
                "UPDATE collection_entries SET quantity = quantity - $2 \
                 WHERE id = $1 RETURNING {ENTRY_COLUMNS}"
            );
            let updated = sqlx::query_as::<_, CollectionEntry>(&query)
                .bind(entry_id)
                .bind(remove.quantity)
                .fetch_one(&mut *tx)
                .await?;
            Some(updated)
        };

        tx.commit().await?;
        Ok(result)
    }

    /// Update an entry in place. Supplied scalars replace; nullable fields
    /// clear on explicit `null`; `tag_ids` replaces the whole tag set.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        entry_id: DbId,
        update: &UpdateCollectionEntry,
    ) -> Result<CollectionEntry, DbError> {
        if let Some(quantity) = update.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(condition) = &update.condition {
            validate_condition(condition)?;
        }
        if let Some(Some(notes)) = &update.notes {
            validate_notes(Some(notes))?;
        }

        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM collection_entries \
             WHERE id = $1 AND user_id = $2 FOR UPDATE"
        );
        let current = sqlx::query_as::<_, CollectionEntry>(&query)
            .bind(entry_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "CollectionEntry",
                id: entry_id,
            })?;

        // Absent Option fields keep the stored value; Some(None) clears.
        let folder_id = match update.folder_id {
            Some(value) => value,
            None => current.folder_id,
        };
        let acquired_date = match update.acquired_date {
            Some(value) => value,
            None => current.acquired_date,
        };
        let notes = match &update.notes {
            Some(value) => value.clone(),
            None => current.notes.clone(),
        };
        let custom_fields = match &update.custom_fields {
            Some(value) => Some(value.clone()),
            None => current.custom_fields.clone(),
        };

        let query = format!(
            "UPDATE collection_entries SET \
                quantity = $2, condition = $3, is_foil = $4, folder_id = $5, \
                acquired_date = $6, notes = $7, custom_fields = $8 \
             WHERE id = $1 RETURNING {ENTRY_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, CollectionEntry>(&query)
            .bind(entry_id)
            .bind(update.quantity.unwrap_or(current.quantity))
            .bind(update.condition.as_deref().unwrap_or(&current.condition))
            .bind(update.is_foil.unwrap_or(current.is_foil))
            .bind(folder_id)
            .bind(acquired_date)
            .bind(notes.as_deref())
            .bind(custom_fields.as_ref())
            .fetch_one(&mut *tx)
            .await?;

        if let Some(tag_ids) = &update.tag_ids {
            sqlx::query("DELETE FROM collection_entry_tags WHERE entry_id = $1")
                .bind(entry_id)
                .execute(&mut *tx)
                .await?;
            apply_tags(&mut tx, user_id, entry_id, tag_ids).await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Move entries to a folder (or unfile them) in one unit. Rejects the
    /// whole request if any entry id does not resolve for this user.
    pub async fn bulk_move_to_folder(
        pool: &PgPool,
        user_id: DbId,
        request: &BulkMoveToFolder,
    ) -> Result<u64, DbError> {
        let mut tx = pool.begin().await?;

        if let Some(folder_id) = request.folder_id {
            let owned = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM collection_folders WHERE id = $1 AND user_id = $2)",
            )
            .bind(folder_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
            if !owned {
                return Err(CoreError::NotFound {
                    entity: "Folder",
                    id: folder_id,
                }
                .into());
            }
        }

        check_entries_resolve(&mut tx, user_id, &request.entry_ids).await?;

        let result = sqlx::query(
            "UPDATE collection_entries SET folder_id = $1 \
             WHERE user_id = $2 AND id = ANY($3)",
        )
        .bind(request.folder_id)
        .bind(user_id)
        .bind(&request.entry_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Attach tags to entries in one unit. Already-attached pairs are
    /// skipped; any missing entry or tag id rejects the whole request.
    pub async fn bulk_add_tags(
        pool: &PgPool,
        user_id: DbId,
        request: &BulkAddTags,
    ) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;

        check_entries_resolve(&mut tx, user_id, &request.entry_ids).await?;

        let found_tags = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM tags WHERE user_id = $1 AND id = ANY($2)",
        )
        .bind(user_id)
        .bind(&request.tag_ids)
        .fetch_all(&mut *tx)
        .await?;
        let missing: Vec<DbId> = request
            .tag_ids
            .iter()
            .copied()
            .filter(|id| !found_tags.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::PartialFailure {
                entity: "Tag",
                failed_ids: missing,
            }
            .into());
        }

        sqlx::query(
            "INSERT INTO collection_entry_tags (entry_id, tag_id) \
             SELECT e.id, t.id FROM unnest($1::bigint[]) AS e(id) \
             CROSS JOIN unnest($2::bigint[]) AS t(id) \
             ON CONFLICT DO NOTHING",
        )
        .bind(&request.entry_ids)
        .bind(&request.tag_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Find an entry by ID, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: DbId,
        entry_id: DbId,
    ) -> Result<Option<CollectionEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM collection_entries \
             WHERE id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, CollectionEntry>(&query)
            .bind(entry_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List entries with optional filters, joined to the catalog for
    /// name-based search and sorting.
    pub async fn list(
        pool: &PgPool,
        user_id: DbId,
        params: &CollectionListParams,
    ) -> Result<Vec<CollectionEntry>, DbError> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let mut conditions = vec!["ce.user_id = $1".to_string()];
        let mut arg = 1;
        let mut next = || {
            arg += 1;
            arg
        };

        if params.search.is_some() {
            conditions.push(format!("c.name ILIKE '%' || ${} || '%'", next()));
        }
        let folder_filter = match params.folder_id.as_deref() {
            None => None,
            Some("unfiled") => {
                conditions.push("ce.folder_id IS NULL".to_string());
                None
            }
            Some(raw) => {
                let id: DbId = raw
                    .parse()
                    .map_err(|_| CoreError::Validation(format!("invalid folder id '{raw}'")))?;
                conditions.push(format!("ce.folder_id = ${}", next()));
                Some(id)
            }
        };
        if params.condition.is_some() {
            conditions.push(format!("ce.condition = ${}", next()));
        }
        if params.is_foil.is_some() {
            conditions.push(format!("ce.is_foil = ${}", next()));
        }
        if params.set_code.is_some() {
            conditions.push(format!("p.set_code = ${}", next()));
        }
        if let Some(tag_ids) = &params.tag_ids {
            if !tag_ids.is_empty() {
                // Entries must carry ALL requested tags.
                conditions.push(format!(
                    "(SELECT COUNT(*) FROM collection_entry_tags et \
                      WHERE et.entry_id = ce.id AND et.tag_id = ANY(${})) = {}",
                    next(),
                    tag_ids.len()
                ));
            }
        }

        let order = sort_clause(params);
        let query = format!(
            "SELECT {QUALIFIED_ENTRY_COLUMNS} FROM collection_entries ce \
             JOIN card_prints p ON p.id = ce.card_print_id \
             JOIN cards c ON c.id = p.card_id \
             WHERE {} ORDER BY {order} LIMIT ${} OFFSET ${}",
            conditions.join(" AND "),
            next(),
            next()
        );

        let mut q = sqlx::query_as::<_, CollectionEntry>(&query).bind(user_id);
        if let Some(search) = &params.search {
            q = q.bind(search);
        }
        if let Some(folder_id) = folder_filter {
            q = q.bind(folder_id);
        }
        if let Some(condition) = &params.condition {
            q = q.bind(condition);
        }
        if let Some(is_foil) = params.is_foil {
            q = q.bind(is_foil);
        }
        if let Some(set_code) = &params.set_code {
            q = q.bind(set_code);
        }
        if let Some(tag_ids) = &params.tag_ids {
            if !tag_ids.is_empty() {
                q = q.bind(tag_ids);
            }
        }
        let entries = q.bind(limit).bind(offset).fetch_all(pool).await?;
        Ok(entries)
    }

    /// Aggregate collection statistics for one user.
    pub async fn stats(pool: &PgPool, user_id: DbId) -> Result<CollectionStats, sqlx::Error> {
        let rows = sqlx::query_as::<_, StatsRow>(
            "SELECT c.oracle_id, ce.quantity, ce.condition, ce.is_foil, \
                    f.name AS folder_name, p.foil, p.nonfoil, \
                    p.price_usd, p.price_usd_foil, p.price_eur, p.price_eur_foil \
             FROM collection_entries ce \
             JOIN card_prints p ON p.id = ce.card_print_id \
             JOIN cards c ON c.id = p.card_id \
             LEFT JOIN collection_folders f ON f.id = ce.folder_id \
             WHERE ce.user_id = $1",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let mut oracles = std::collections::HashSet::new();
        let mut total_cards: i64 = 0;
        let mut total_value_usd: Option<f64> = None;
        let mut total_value_eur: Option<f64> = None;
        let mut foil_count: i64 = 0;
        let mut by_condition: BTreeMap<String, i64> = BTreeMap::new();
        let mut by_folder: BTreeMap<String, i64> = BTreeMap::new();

        for row in rows {
            let quantity = i64::from(row.quantity);
            oracles.insert(row.oracle_id);
            total_cards += quantity;
            if row.is_foil {
                foil_count += quantity;
            }
            *by_condition.entry(row.condition.clone()).or_insert(0) += quantity;
            let folder = row.folder_name.clone().unwrap_or_else(|| "unfiled".into());
            *by_folder.entry(folder).or_insert(0) += quantity;

            let prices = deckforge_core::card::PrintPrices {
                usd: row.price_usd,
                usd_foil: row.price_usd_foil,
                eur: row.price_eur,
                eur_foil: row.price_eur_foil,
            };
            let prefer_foil = row.is_foil || (row.foil && !row.nonfoil);
            if let Some(price) = prices.best(Currency::Usd, prefer_foil) {
                *total_value_usd.get_or_insert(0.0) += price * quantity as f64;
            }
            if let Some(price) = prices.best(Currency::Eur, prefer_foil) {
                *total_value_eur.get_or_insert(0.0) += price * quantity as f64;
            }
        }

        Ok(CollectionStats {
            unique_cards: oracles.len() as i64,
            total_cards,
            total_value_usd,
            total_value_eur,
            foil_count,
            by_condition,
            by_folder,
        })
    }
}

/// Row shape for the statistics fold.
#[derive(FromRow)]
struct StatsRow {
    oracle_id: Uuid,
    quantity: i32,
    condition: String,
    is_foil: bool,
    folder_name: Option<String>,
    foil: bool,
    nonfoil: bool,
    price_usd: Option<String>,
    price_usd_foil: Option<String>,
    price_eur: Option<String>,
    price_eur_foil: Option<String>,
}

fn sort_clause(params: &CollectionListParams) -> String {
    let direction = match params.sort_direction {
        Some(deckforge_core::merge::SortDirection::Desc) => "DESC",
        _ => "ASC",
    };
    let column = match params.sort_by {
        Some(CollectionSortBy::Name) => "c.name",
        Some(CollectionSortBy::AcquiredDate) => "ce.acquired_date",
        Some(CollectionSortBy::Quantity) => "ce.quantity",
        Some(CollectionSortBy::Price) => "NULLIF(p.price_usd, '')::numeric",
        Some(CollectionSortBy::SetCode) => "p.set_code",
        Some(CollectionSortBy::Condition) => "ce.condition",
        Some(CollectionSortBy::CreatedAt) | None => "ce.created_at",
    };
    // Secondary id key keeps pagination stable across equal sort values.
    format!("{column} {direction} NULLS LAST, ce.id {direction}")
}

fn validate_quantity(quantity: i32) -> Result<(), CoreError> {
    if quantity < 1 {
        return Err(CoreError::Validation(format!(
            "quantity must be at least 1, got {quantity}"
        )));
    }
    Ok(())
}

fn validate_condition(condition: &str) -> Result<(), CoreError> {
    if Condition::from_code(condition).is_none() {
        return Err(CoreError::Validation(format!(
            "unknown condition '{condition}'"
        )));
    }
    Ok(())
}

fn validate_notes(notes: Option<&str>) -> Result<(), CoreError> {
    if let Some(notes) = notes {
        if notes.chars().count() > MAX_NOTES_LENGTH {
            return Err(CoreError::Validation(format!(
                "notes exceed {MAX_NOTES_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Tag associations are written only for a freshly created entry. An
/// additive add against an existing natural key bumps quantity and leaves
/// folder, notes, custom fields, and tags alone.
fn tags_for_new_entry(inserted: bool, tag_ids: Option<&[DbId]>) -> Option<&[DbId]> {
    if inserted {
        tag_ids
    } else {
        None
    }
}

/// Attach tags to an entry, rejecting foreign or missing tag ids.
async fn apply_tags(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: DbId,
    entry_id: DbId,
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
        "INSERT INTO collection_entry_tags (entry_id, tag_id) \
         SELECT $1, unnest($2::bigint[]) \
         ON CONFLICT DO NOTHING",
    )
    .bind(entry_id)
    .bind(tag_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Reject the request if any entry id does not resolve for this user.
async fn check_entries_resolve(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: DbId,
    entry_ids: &[DbId],
) -> Result<(), DbError> {
    let found = sqlx::query_scalar::<_, DbId>(
        "SELECT id FROM collection_entries WHERE user_id = $1 AND id = ANY($2)",
    )
    .bind(user_id)
    .bind(entry_ids)
    .fetch_all(&mut **tx)
    .await?;
    let missing: Vec<DbId> = entry_ids
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::PartialFailure {
            entity: "CollectionEntry",
            failed_ids: missing,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_add_leaves_tags_alone() {
        let tags = vec![3, 5];
        // The DO UPDATE branch (existing natural key) must not touch tags.
        assert_eq!(tags_for_new_entry(false, Some(&tags)), None);
        assert_eq!(
            tags_for_new_entry(true, Some(&tags)),
            Some(tags.as_slice())
        );
        assert_eq!(tags_for_new_entry(true, None), None);
    }
}
