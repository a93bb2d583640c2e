//! Load-side of the ownership ledger: owned and used totals per print.
//!
//! The fold itself lives in `deckforge_core::ownership`; this module only
//! runs the two aggregate queries and hands the totals over. Recomputed per
//! request, never cached or persisted.

use std::collections::HashMap;

use deckforge_core::ownership::{CardOwnership, OwnershipLedger};
use deckforge_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Provides ownership projections for one user.
pub struct OwnershipRepo;

impl OwnershipRepo {
    /// Owned quantity per print: all conditions and foil variants summed.
    pub async fn owned_by_print(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<(DbId, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, i64)>(
            "SELECT card_print_id, SUM(quantity)::bigint \
             FROM collection_entries WHERE user_id = $1 \
             GROUP BY card_print_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Used quantity per print across the user's decks. When the ledger is
    /// computed for one deck, that deck's own rows are excluded so a fully
    /// owned deck reads as owned rather than consumed by itself.
    pub async fn used_by_print(
        pool: &PgPool,
        user_id: DbId,
        exclude_deck: Option<DbId>,
    ) -> Result<Vec<(DbId, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, i64)>(
            "SELECT dc.card_print_id, SUM(dc.quantity)::bigint \
             FROM deck_cards dc \
             JOIN deck_sections s ON s.id = dc.section_id \
             JOIN decks d ON d.id = s.deck_id \
             WHERE d.user_id = $1 AND ($2::bigint IS NULL OR d.id <> $2) \
             GROUP BY dc.card_print_id",
        )
        .bind(user_id)
        .bind(exclude_deck)
        .fetch_all(pool)
        .await
    }

    /// Build the per-print ledger. Negative availability surfaces as
    /// `InconsistentState` from the core fold.
    pub async fn build_ledger(
        pool: &PgPool,
        user_id: DbId,
        exclude_deck: Option<DbId>,
    ) -> Result<OwnershipLedger, DbError> {
        let owned = Self::owned_by_print(pool, user_id).await?;
        let used = Self::used_by_print(pool, user_id, exclude_deck).await?;
        Ok(OwnershipLedger::build(owned, used)?)
    }

    /// Oracle-level rollup for suggestion ranking: owned and used totals per
    /// rules identity, folded into wire-shape ownership figures.
    pub async fn ownership_by_oracle(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<HashMap<Uuid, CardOwnership>, sqlx::Error> {
        let owned = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT c.oracle_id, SUM(ce.quantity)::bigint \
             FROM collection_entries ce \
             JOIN card_prints p ON p.id = ce.card_print_id \
             JOIN cards c ON c.id = p.card_id \
             WHERE ce.user_id = $1 \
             GROUP BY c.oracle_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let used = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT c.oracle_id, SUM(dc.quantity)::bigint \
             FROM deck_cards dc \
             JOIN deck_sections s ON s.id = dc.section_id \
             JOIN decks d ON d.id = s.deck_id \
             JOIN card_prints p ON p.id = dc.card_print_id \
             JOIN cards c ON c.id = p.card_id \
             WHERE d.user_id = $1 \
             GROUP BY c.oracle_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let mut totals: HashMap<Uuid, (i64, i64)> = HashMap::new();
        for (oracle_id, quantity) in owned {
            totals.entry(oracle_id).or_default().0 += quantity;
        }
        for (oracle_id, quantity) in used {
            totals.entry(oracle_id).or_default().1 += quantity;
        }

        Ok(totals
            .into_iter()
            .map(|(oracle_id, (owned, used))| (oracle_id, CardOwnership::from_totals(owned, used)))
            .collect())
    }
}
