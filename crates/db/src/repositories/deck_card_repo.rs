//! Repository for the `deck_cards` table: the validated commit path.
//!
//! Every composition mutation follows propose -> validate -> commit|reject
//! inside one transaction. The deck row is taken `FOR UPDATE` first, so
//! concurrent mutations of the same deck serialize and validation always
//! sees the latest committed state. Nothing is written when a rule rejects
//! the hypothetical state; commits bump `decks.version`.

use deckforge_core::card::parse_colors;
use deckforge_core::composition::{validate_reorder, validate_section, CompositionCard};
use deckforge_core::error::CoreError;
use deckforge_core::types::DbId;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::card::ResolvedPrint;
use crate::models::deck::{
    AddDeckCard, BulkAddDeckCards, DeckCard, DeckCardDetails, MoveDeckCard, ReorderDeckCards,
    UpdateDeckCard,
};
use crate::repositories::catalog_repo::CatalogRepo;
use crate::repositories::deck_repo::{bump_version, find_section_for_user, lock_deck};
use crate::DbError;

/// Column list for `deck_cards` queries.
const DECK_CARD_COLUMNS: &str = "\
    id, section_id, card_print_id, quantity, position, notes, created_at, \
    updated_at";

/// Maximum length of a deck card's notes field.
const MAX_CARD_NOTES_LENGTH: usize = 200;

/// Provides validated mutations and listing for deck cards.
pub struct DeckCardRepo;

impl DeckCardRepo {
    /// All cards of a deck, joined to the catalog, ordered by section then
    /// card position.
    pub async fn list_for_deck(
        pool: &PgPool,
        deck_id: DbId,
    ) -> Result<Vec<DeckCardDetails>, sqlx::Error> {
        sqlx::query_as::<_, DeckCardDetails>(
            "SELECT dc.id, dc.section_id, dc.card_print_id, c.oracle_id, c.name, \
                    c.mana_cost, c.type_line, c.oracle_text, c.colors, c.cmc, \
                    p.set_code, p.foil, p.nonfoil, p.price_usd, p.price_usd_foil, \
                    p.price_eur, p.price_eur_foil, dc.quantity, dc.position, dc.notes \
             FROM deck_cards dc \
             JOIN deck_sections s ON s.id = dc.section_id \
             JOIN card_prints p ON p.id = dc.card_print_id \
             JOIN cards c ON c.id = p.card_id \
             WHERE s.deck_id = $1 \
             ORDER BY s.position, dc.position",
        )
        .bind(deck_id)
        .fetch_all(pool)
        .await
    }

    /// Add a card to a section. A print already in the section merges
    /// quantities instead of duplicating the row.
    pub async fn add(
        pool: &PgPool,
        user_id: DbId,
        deck_id: DbId,
        add: &AddDeckCard,
    ) -> Result<DeckCard, DbError> {
        validate_quantity(add.quantity)?;
        validate_notes(add.notes.as_deref())?;

        let mut tx = pool.begin().await?;
        lock_deck(&mut tx, user_id, deck_id).await?;

        let card = add_to_section(&mut tx, deck_id, add).await?;
        bump_version(&mut tx, deck_id).await?;

        tx.commit().await?;
        Ok(card)
    }

    /// Add several cards in one all-or-nothing unit. Each add is validated
    /// against the state the previous ones produced; the first rejection
    /// rolls everything back.
    pub async fn bulk_add(
        pool: &PgPool,
        user_id: DbId,
        deck_id: DbId,
        bulk: &BulkAddDeckCards,
    ) -> Result<Vec<DeckCard>, DbError> {
        for add in &bulk.cards {
            validate_quantity(add.quantity)?;
            validate_notes(add.notes.as_deref())?;
        }

        let mut tx = pool.begin().await?;
        lock_deck(&mut tx, user_id, deck_id).await?;

        let mut created = Vec::with_capacity(bulk.cards.len());
        for add in &bulk.cards {
            created.push(add_to_section(&mut tx, deck_id, add).await?);
        }
        bump_version(&mut tx, deck_id).await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Update a card's quantity or notes. A quantity change re-validates the
    /// section and bumps the deck version.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        card_id: DbId,
        update: &UpdateDeckCard,
    ) -> Result<DeckCard, DbError> {
        if let Some(quantity) = update.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(Some(notes)) = &update.notes {
            validate_notes(Some(notes))?;
        }

        let mut tx = pool.begin().await?;

        let provisional = locate_card(&mut tx, user_id, card_id).await?;
        lock_deck(&mut tx, user_id, provisional.deck_id).await?;
        // The row may have moved while we waited for the lock; re-read its
        // location under it so validation sees the latest committed state.
        let located = locate_card(&mut tx, user_id, card_id).await?;

        if let Some(quantity) = update.quantity {
            let mut composition = section_composition(&mut tx, located.section_id).await?;
            for entry in &mut composition {
                if entry.row_id == card_id {
                    entry.card.quantity = quantity;
                }
            }
            let rules = section_rules(&mut tx, located.section_id).await?;
            validate_section(&rules, &cards_of(&composition))?;
        }

        let current = fetch_card(&mut tx, card_id).await?;
        let notes = match &update.notes {
            Some(value) => value.clone(),
            None => current.notes.clone(),
        };
        let query = format!(
            "UPDATE deck_cards SET quantity = $2, notes = $3 \
             WHERE id = $1 RETURNING {DECK_CARD_COLUMNS}"
        );
        let card = sqlx::query_as::<_, DeckCard>(&query)
            .bind(card_id)
            .bind(update.quantity.unwrap_or(current.quantity))
            .bind(notes.as_deref())
            .fetch_one(&mut *tx)
            .await?;

        if update.quantity.is_some_and(|q| q != current.quantity) {
            bump_version(&mut tx, located.deck_id).await?;
        }

        tx.commit().await?;
        Ok(card)
    }

    /// Remove a card. Source positions re-densify; the deck version bumps.
    pub async fn remove(pool: &PgPool, user_id: DbId, card_id: DbId) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;

        let provisional = locate_card(&mut tx, user_id, card_id).await?;
        lock_deck(&mut tx, user_id, provisional.deck_id).await?;
        // The row may have moved while we waited for the lock; re-read its
        // location under it so validation sees the latest committed state.
        let located = locate_card(&mut tx, user_id, card_id).await?;

        sqlx::query("DELETE FROM deck_cards WHERE id = $1")
            .bind(card_id)
            .execute(&mut *tx)
            .await?;
        densify_positions(&mut tx, located.section_id).await?;
        bump_version(&mut tx, located.deck_id).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Move a card to another section of the same deck. The full validation
    /// pipeline runs against the TARGET section; a same-print row there
    /// absorbs the moved quantity. Position defaults to the end.
    pub async fn move_card(
        pool: &PgPool,
        user_id: DbId,
        card_id: DbId,
        request: &MoveDeckCard,
    ) -> Result<DeckCard, DbError> {
        let mut tx = pool.begin().await?;

        let provisional = locate_card(&mut tx, user_id, card_id).await?;
        lock_deck(&mut tx, user_id, provisional.deck_id).await?;
        // The row may have moved while we waited for the lock; re-read its
        // location under it so validation sees the latest committed state.
        let located = locate_card(&mut tx, user_id, card_id).await?;

        let target = find_section_for_user(&mut tx, user_id, request.target_section_id).await?;
        if target.deck_id != located.deck_id {
            return Err(CoreError::Validation(
                "target section belongs to a different deck".to_string(),
            )
            .into());
        }
        if target.id == located.section_id {
            return Err(CoreError::Validation(
                "card is already in the target section".to_string(),
            )
            .into());
        }

        let moving = fetch_card(&mut tx, card_id).await?;
        let print = resolve_print_in_tx(&mut tx, moving.card_print_id).await?;

        // Hypothetical target state: merge into an existing same-print row
        // or append the moved card.
        let mut target_composition = section_composition(&mut tx, target.id).await?;
        let merge_row = target_composition
            .iter()
            .find(|entry| entry.card.card_print_id == moving.card_print_id)
            .map(|entry| entry.row_id);
        match merge_row {
            Some(row_id) => {
                for entry in &mut target_composition {
                    if entry.row_id == row_id {
                        entry.card.quantity += moving.quantity;
                    }
                }
            }
            None => target_composition.push(NumberedCard {
                row_id: card_id,
                card: composition_card(&print, moving.quantity),
            }),
        }
        validate_section(&target.rules(), &cards_of(&target_composition))?;

        let result = match merge_row {
            Some(row_id) => {
                sqlx::query("DELETE FROM deck_cards WHERE id = $1")
                    .bind(card_id)
                    .execute(&mut *tx)
                    .await?;
                let query = format!(
                    "UPDATE deck_cards SET quantity = quantity + $2 \
                     WHERE id = $1 RETURNING {DECK_CARD_COLUMNS}"
                );
                sqlx::query_as::<_, DeckCard>(&query)
                    .bind(row_id)
                    .bind(moving.quantity)
                    .fetch_one(&mut *tx)
                    .await?
            }
            None => {
                let end = sqlx::query_scalar::<_, i32>(
                    "SELECT COALESCE(MAX(position) + 1, 0) FROM deck_cards WHERE section_id = $1",
                )
                .bind(target.id)
                .fetch_one(&mut *tx)
                .await?;
                let position = request.position.unwrap_or(end).clamp(0, end);
                // Park at the end, then densify with the requested slot.
                let query = format!(
                    "UPDATE deck_cards SET section_id = $2, position = $3 \
                     WHERE id = $1 RETURNING {DECK_CARD_COLUMNS}"
                );
                let card = sqlx::query_as::<_, DeckCard>(&query)
                    .bind(card_id)
                    .bind(target.id)
                    .bind(end)
                    .fetch_one(&mut *tx)
                    .await?;
                if position != end {
                    insert_at_position(&mut tx, target.id, card_id, position).await?;
                }
                card
            }
        };

        densify_positions(&mut tx, located.section_id).await?;
        bump_version(&mut tx, located.deck_id).await?;

        tx.commit().await?;
        Ok(result)
    }

    /// Reorder the cards of one section. The supplied ids must be exactly
    /// the current membership; positions 0..n-1 are assigned in request
    /// order. Composition is unchanged, so the version does not bump.
    pub async fn reorder(
        pool: &PgPool,
        user_id: DbId,
        section_id: DbId,
        reorder: &ReorderDeckCards,
    ) -> Result<Vec<DeckCard>, DbError> {
        let mut tx = pool.begin().await?;

        let section = find_section_for_user(&mut tx, user_id, section_id).await?;
        lock_deck(&mut tx, user_id, section.deck_id).await?;

        let current_ids = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM deck_cards WHERE section_id = $1 ORDER BY position",
        )
        .bind(section_id)
        .fetch_all(&mut *tx)
        .await?;
        validate_reorder(&current_ids, &reorder.card_ids)?;

        for (position, card_id) in reorder.card_ids.iter().enumerate() {
            sqlx::query("UPDATE deck_cards SET position = $2 WHERE id = $1")
                .bind(card_id)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        let query = format!(
            "SELECT {DECK_CARD_COLUMNS} FROM deck_cards \
             WHERE section_id = $1 ORDER BY position"
        );
        let cards = sqlx::query_as::<_, DeckCard>(&query)
            .bind(section_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(cards)
    }
}

// ---------------------------------------------------------------------------
// Transaction helpers
// ---------------------------------------------------------------------------

/// A composition card tagged with its `deck_cards` row id.
struct NumberedCard {
    row_id: DbId,
    card: CompositionCard,
}

fn cards_of(entries: &[NumberedCard]) -> Vec<CompositionCard> {
    entries.iter().map(|entry| entry.card.clone()).collect()
}

/// Where a deck card lives: its section and deck, ownership enforced.
struct LocatedCard {
    section_id: DbId,
    deck_id: DbId,
}

async fn locate_card(
    tx: &mut Transaction<'_, Postgres>,
    user_id: DbId,
    card_id: DbId,
) -> Result<LocatedCard, DbError> {
    let row: Option<(DbId, DbId)> = sqlx::query_as(
        "SELECT dc.section_id, s.deck_id FROM deck_cards dc \
         JOIN deck_sections s ON s.id = dc.section_id \
         JOIN decks d ON d.id = s.deck_id \
         WHERE dc.id = $1 AND d.user_id = $2",
    )
    .bind(card_id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?;
    let (section_id, deck_id) = row.ok_or(CoreError::NotFound {
        entity: "DeckCard",
        id: card_id,
    })?;
    Ok(LocatedCard {
        section_id,
        deck_id,
    })
}

async fn fetch_card(
    tx: &mut Transaction<'_, Postgres>,
    card_id: DbId,
) -> Result<DeckCard, sqlx::Error> {
    let query = format!("SELECT {DECK_CARD_COLUMNS} FROM deck_cards WHERE id = $1");
    sqlx::query_as::<_, DeckCard>(&query)
        .bind(card_id)
        .fetch_one(&mut **tx)
        .await
}

/// Current composition of a section in the shape the validator consumes.
async fn section_composition(
    tx: &mut Transaction<'_, Postgres>,
    section_id: DbId,
) -> Result<Vec<NumberedCard>, sqlx::Error> {
    #[derive(FromRow)]
    struct Row {
        id: DbId,
        card_print_id: DbId,
        oracle_id: Uuid,
        name: String,
        quantity: i32,
        colors: Vec<String>,
        type_line: String,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT dc.id, dc.card_print_id, c.oracle_id, c.name, dc.quantity, \
                c.colors, c.type_line \
         FROM deck_cards dc \
         JOIN card_prints p ON p.id = dc.card_print_id \
         JOIN cards c ON c.id = p.card_id \
         WHERE dc.section_id = $1 \
         ORDER BY dc.position",
    )
    .bind(section_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| NumberedCard {
            row_id: row.id,
            card: CompositionCard {
                card_print_id: row.card_print_id,
                oracle_id: row.oracle_id,
                name: row.name,
                quantity: row.quantity,
                colors: parse_colors(&row.colors),
                type_line: row.type_line,
            },
        })
        .collect())
}

async fn section_rules(
    tx: &mut Transaction<'_, Postgres>,
    section_id: DbId,
) -> Result<deckforge_core::composition::SectionRules, sqlx::Error> {
    let rules: Option<serde_json::Value> =
        sqlx::query_scalar("SELECT validation_rules FROM deck_sections WHERE id = $1")
            .bind(section_id)
            .fetch_one(&mut **tx)
            .await?;
    Ok(rules
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

async fn resolve_print_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    print_id: DbId,
) -> Result<ResolvedPrint, DbError> {
    CatalogRepo::resolve_print_tx(tx, print_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "CardPrint",
                id: print_id,
            }
            .into()
        })
}

fn composition_card(print: &ResolvedPrint, quantity: i32) -> CompositionCard {
    CompositionCard {
        card_print_id: print.print_id,
        oracle_id: print.oracle_id,
        name: print.name.clone(),
        quantity,
        colors: parse_colors(&print.colors),
        type_line: print.type_line.clone(),
    }
}

/// Validated add of one card to one section, inside an already-locked deck
/// transaction.
async fn add_to_section(
    tx: &mut Transaction<'_, Postgres>,
    deck_id: DbId,
    add: &AddDeckCard,
) -> Result<DeckCard, DbError> {
    let section_deck: Option<DbId> =
        sqlx::query_scalar("SELECT deck_id FROM deck_sections WHERE id = $1")
            .bind(add.section_id)
            .fetch_optional(&mut **tx)
            .await?;
    match section_deck {
        Some(owner) if owner == deck_id => {}
        _ => {
            return Err(CoreError::NotFound {
                entity: "DeckSection",
                id: add.section_id,
            }
            .into())
        }
    }

    let print = resolve_print_in_tx(tx, add.card_print_id).await?;
    let rules = section_rules(tx, add.section_id).await?;

    let mut composition = section_composition(tx, add.section_id).await?;
    let merge_row = composition
        .iter()
        .find(|entry| entry.card.card_print_id == add.card_print_id)
        .map(|entry| entry.row_id);
    match merge_row {
        Some(row_id) => {
            for entry in &mut composition {
                if entry.row_id == row_id {
                    entry.card.quantity += add.quantity;
                }
            }
        }
        None => composition.push(NumberedCard {
            row_id: 0,
            card: composition_card(&print, add.quantity),
        }),
    }
    validate_section(&rules, &cards_of(&composition))?;

    let card = match merge_row {
        Some(row_id) => {
            let query = format!(
                "UPDATE deck_cards SET quantity = quantity + $2 \
                 WHERE id = $1 RETURNING {DECK_CARD_COLUMNS}"
            );
            sqlx::query_as::<_, DeckCard>(&query)
                .bind(row_id)
                .bind(add.quantity)
                .fetch_one(&mut **tx)
                .await?
        }
        None => {
            let query = format!(
                "INSERT INTO deck_cards (section_id, card_print_id, quantity, position, notes) \
                 VALUES ($1, $2, $3, \
                         (SELECT COALESCE(MAX(position) + 1, 0) FROM deck_cards \
                          WHERE section_id = $1), $4) \
                 RETURNING {DECK_CARD_COLUMNS}"
            );
            sqlx::query_as::<_, DeckCard>(&query)
                .bind(add.section_id)
                .bind(add.card_print_id)
                .bind(add.quantity)
                .bind(add.notes.as_deref())
                .fetch_one(&mut **tx)
                .await?
        }
    };
    Ok(card)
}

/// Rewrite a section's positions to 0..n-1, keeping the current order.
async fn densify_positions(
    tx: &mut Transaction<'_, Postgres>,
    section_id: DbId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE deck_cards dc SET position = ranked.new_position \
         FROM (SELECT id, ROW_NUMBER() OVER (ORDER BY position) - 1 AS new_position \
               FROM deck_cards WHERE section_id = $1) ranked \
         WHERE dc.id = ranked.id AND dc.position <> ranked.new_position",
    )
    .bind(section_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Slot a card at `position` and shift the rest, then densify.
async fn insert_at_position(
    tx: &mut Transaction<'_, Postgres>,
    section_id: DbId,
    card_id: DbId,
    position: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE deck_cards SET position = position + 1 \
         WHERE section_id = $1 AND position >= $2 AND id <> $3",
    )
    .bind(section_id)
    .bind(position)
    .bind(card_id)
    .execute(&mut **tx)
    .await?;
    sqlx::query("UPDATE deck_cards SET position = $2 WHERE id = $1")
        .bind(card_id)
        .bind(position)
        .execute(&mut **tx)
        .await?;
    densify_positions(tx, section_id).await?;
    Ok(())
}

fn validate_quantity(quantity: i32) -> Result<(), CoreError> {
    if quantity < 1 {
        return Err(CoreError::Validation(format!(
            "quantity must be at least 1, got {quantity}"
        )));
    }
    Ok(())
}

fn validate_notes(notes: Option<&str>) -> Result<(), CoreError> {
    if let Some(notes) = notes {
        if notes.chars().count() > MAX_CARD_NOTES_LENGTH {
            return Err(CoreError::Validation(format!(
                "notes exceed {MAX_CARD_NOTES_LENGTH} characters"
            )));
        }
    }
    Ok(())
}
