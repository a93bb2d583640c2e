//! Repository for the read-only card catalog (`cards` and `card_prints`).
//!
//! Catalog rows are ingested by an external pipeline; this system only
//! resolves and searches them.

use deckforge_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::card::{Card, CardPrint, CardSearchParams, ResolvedPrint};

/// Column list for `cards` queries.
const CARD_COLUMNS: &str = "\
    id, oracle_id, name, mana_cost, type_line, oracle_text, colors, cmc, \
    legalities, scryfall_uri, created_at, updated_at";

/// Column list for `card_prints` queries.
const PRINT_COLUMNS: &str = "\
    id, card_id, scryfall_id, set_code, collector_number, rarity, image_url, \
    foil, nonfoil, price_usd, price_usd_foil, price_eur, price_eur_foil, \
    language, created_at, updated_at";

/// Column list for print-joined-to-identity queries (`card_prints p` joined
/// to `cards c`).
const RESOLVED_COLUMNS: &str = "\
    p.id AS print_id, c.oracle_id, c.name, c.mana_cost, c.type_line, \
    c.oracle_text, c.colors, c.cmc, c.legalities, p.set_code, p.foil, \
    p.nonfoil, p.price_usd, p.price_usd_foil, p.price_eur, p.price_eur_foil";

/// Default result count for card search.
const DEFAULT_SEARCH_LIMIT: i64 = 50;

/// Maximum result count for card search.
const MAX_SEARCH_LIMIT: i64 = 200;

/// Candidate pool size fetched per recommendation run, before role
/// filtering.
const CANDIDATE_POOL_SIZE: i64 = 400;

/// Provides lookup and search over the card catalog.
pub struct CatalogRepo;

impl CatalogRepo {
    /// Find a rules identity by oracle ID.
    pub async fn find_card_by_oracle(
        pool: &PgPool,
        oracle_id: Uuid,
    ) -> Result<Option<Card>, sqlx::Error> {
        let query = format!("SELECT {CARD_COLUMNS} FROM cards WHERE oracle_id = $1");
        sqlx::query_as::<_, Card>(&query)
            .bind(oracle_id)
            .fetch_optional(pool)
            .await
    }

    /// All printings of one rules identity, newest set first.
    pub async fn prints_for_card(
        pool: &PgPool,
        card_id: DbId,
    ) -> Result<Vec<CardPrint>, sqlx::Error> {
        let query = format!(
            "SELECT {PRINT_COLUMNS} FROM card_prints \
             WHERE card_id = $1 ORDER BY id DESC"
        );
        sqlx::query_as::<_, CardPrint>(&query)
            .bind(card_id)
            .fetch_all(pool)
            .await
    }

    /// Resolve one print to the joined shape validation and statistics
    /// consume.
    pub async fn resolve_print(
        pool: &PgPool,
        print_id: DbId,
    ) -> Result<Option<ResolvedPrint>, sqlx::Error> {
        let query = format!(
            "SELECT {RESOLVED_COLUMNS} FROM card_prints p \
             JOIN cards c ON c.id = p.card_id \
             WHERE p.id = $1"
        );
        sqlx::query_as::<_, ResolvedPrint>(&query)
            .bind(print_id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve one print inside an open transaction.
    pub async fn resolve_print_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        print_id: DbId,
    ) -> Result<Option<ResolvedPrint>, sqlx::Error> {
        let query = format!(
            "SELECT {RESOLVED_COLUMNS} FROM card_prints p \
             JOIN cards c ON c.id = p.card_id \
             WHERE p.id = $1"
        );
        sqlx::query_as::<_, ResolvedPrint>(&query)
            .bind(print_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Resolve a batch of prints. Missing ids are simply absent from the
    /// result; callers that need all-or-nothing semantics compare lengths.
    pub async fn resolve_prints(
        pool: &PgPool,
        print_ids: &[DbId],
    ) -> Result<Vec<ResolvedPrint>, sqlx::Error> {
        let query = format!(
            "SELECT {RESOLVED_COLUMNS} FROM card_prints p \
             JOIN cards c ON c.id = p.card_id \
             WHERE p.id = ANY($1)"
        );
        sqlx::query_as::<_, ResolvedPrint>(&query)
            .bind(print_ids)
            .fetch_all(pool)
            .await
    }

    /// Search the catalog. All filters are optional and conjunctive. The
    /// price ceiling compares against USD market prices; display prices
    /// elsewhere follow the user's currency preference.
    pub async fn search(
        pool: &PgPool,
        params: &CardSearchParams,
    ) -> Result<Vec<Card>, sqlx::Error> {
        let limit = params
            .limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT);

        let mut conditions: Vec<String> = Vec::new();
        let mut arg = 0;
        let mut next = || {
            arg += 1;
            arg
        };

        if params.q.is_some() {
            conditions.push(format!("name ILIKE '%' || ${} || '%'", next()));
        }
        if params.format.is_some() {
            conditions.push(format!(
                "legalities->>${} IN ('legal', 'restricted')",
                next()
            ));
        }
        if params.color.is_some() {
            conditions.push(format!(
                "colors <@ string_to_array(upper(${}), NULL)",
                next()
            ));
        }
        if params.max_price.is_some() {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM card_prints p WHERE p.card_id = cards.id \
                 AND NULLIF(p.price_usd, '')::numeric <= ${})",
                next()
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {} ", conditions.join(" AND "))
        };
        let query = format!(
            "SELECT {CARD_COLUMNS} FROM cards {where_clause}ORDER BY name LIMIT ${}",
            next()
        );

        let mut q = sqlx::query_as::<_, Card>(&query);
        if let Some(name) = &params.q {
            q = q.bind(name);
        }
        if let Some(format) = &params.format {
            q = q.bind(format);
        }
        if let Some(color) = &params.color {
            q = q.bind(color);
        }
        if let Some(max_price) = params.max_price {
            q = q.bind(max_price);
        }
        q.bind(limit).fetch_all(pool).await
    }

    /// Candidate pool for recommendation generation: one print per rules
    /// identity (the cheapest priced one), legal in the format, within the
    /// deck's color identity, and not already in the deck.
    ///
    /// Role filtering against identified gaps happens in the caller; this
    /// only narrows by the filters SQL expresses well. `budget_limit` is a
    /// USD ceiling, like the search filter; only the display price on the
    /// final suggestion follows the user's currency preference.
    pub async fn recommendation_candidates(
        pool: &PgPool,
        format: &str,
        color_identity: Option<&[String]>,
        budget_limit: Option<f64>,
        exclude_oracles: &[Uuid],
    ) -> Result<Vec<ResolvedPrint>, sqlx::Error> {
        let mut conditions = vec![
            "c.legalities->>$1 IN ('legal', 'restricted')".to_string(),
            "NOT (c.oracle_id = ANY($2))".to_string(),
        ];
        let mut arg = 2;
        let mut next = || {
            arg += 1;
            arg
        };

        if color_identity.is_some() {
            conditions.push(format!("c.colors <@ ${}", next()));
        }
        if budget_limit.is_some() {
            conditions.push(format!(
                "NULLIF(p.price_usd, '')::numeric <= ${}",
                next()
            ));
        }

        let query = format!(
            "SELECT DISTINCT ON (c.oracle_id) {RESOLVED_COLUMNS} \
             FROM card_prints p \
             JOIN cards c ON c.id = p.card_id \
             WHERE {} \
             ORDER BY c.oracle_id, NULLIF(p.price_usd, '')::numeric ASC NULLS LAST \
             LIMIT ${}",
            conditions.join(" AND "),
            next()
        );

        let mut q = sqlx::query_as::<_, ResolvedPrint>(&query)
            .bind(format)
            .bind(exclude_oracles);
        if let Some(identity) = color_identity {
            q = q.bind(identity);
        }
        if let Some(budget) = budget_limit {
            q = q.bind(budget);
        }
        q.bind(CANDIDATE_POOL_SIZE).fetch_all(pool).await
    }
}
