//! Catalog models: rules identities (`cards`) and printings (`card_prints`).
//!
//! These tables are read-only to this system; ingestion happens elsewhere.

use deckforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `cards` table: one rules identity.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: DbId,
    pub oracle_id: Uuid,
    pub name: String,
    pub mana_cost: Option<String>,
    pub type_line: String,
    pub oracle_text: Option<String>,
    pub colors: Vec<String>,
    pub cmc: f32,
    pub legalities: serde_json::Value,
    pub scryfall_uri: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `card_prints` table: one printing of a rules identity.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPrint {
    pub id: DbId,
    pub card_id: DbId,
    pub scryfall_id: Uuid,
    pub set_code: String,
    pub collector_number: String,
    pub rarity: String,
    pub image_url: Option<String>,
    pub foil: bool,
    pub nonfoil: bool,
    pub price_usd: Option<String>,
    pub price_usd_foil: Option<String>,
    pub price_eur: Option<String>,
    pub price_eur_foil: Option<String>,
    pub language: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A print joined to its rules identity: everything composition validation,
/// statistics, and candidate ranking need about one print.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPrint {
    pub print_id: DbId,
    pub oracle_id: Uuid,
    pub name: String,
    pub mana_cost: Option<String>,
    pub type_line: String,
    pub oracle_text: Option<String>,
    pub colors: Vec<String>,
    pub cmc: f32,
    pub legalities: serde_json::Value,
    pub set_code: String,
    pub foil: bool,
    pub nonfoil: bool,
    pub price_usd: Option<String>,
    pub price_usd_foil: Option<String>,
    pub price_eur: Option<String>,
    pub price_eur_foil: Option<String>,
}

impl ResolvedPrint {
    pub fn prices(&self) -> deckforge_core::card::PrintPrices {
        deckforge_core::card::PrintPrices {
            usd: self.price_usd.clone(),
            usd_foil: self.price_usd_foil.clone(),
            eur: self.price_eur.clone(),
            eur_foil: self.price_eur_foil.clone(),
        }
    }

    /// The print exists only in foil.
    pub fn foil_only(&self) -> bool {
        self.foil && !self.nonfoil
    }
}

/// Query parameters for catalog card search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSearchParams {
    /// Partial name match.
    pub q: Option<String>,
    pub format: Option<String>,
    /// Color letters the result set may use (subset filter).
    pub color: Option<String>,
    /// Ceiling in USD against the cheapest listed print price.
    pub max_price: Option<f64>,
    pub limit: Option<i64>,
}
