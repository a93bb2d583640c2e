//! Ownership ledger: the pure read-side projection that reconciles a user's
//! collection against the cards slotted into their decks.
//!
//! Never persisted and never cached; the database layer loads the owned and
//! used totals fresh and this module folds them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Projection types
// ---------------------------------------------------------------------------

/// Owned / used / available figures for one card print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintOwnership {
    pub owned: i64,
    pub used: i64,
    pub available: i64,
}

/// Ownership summary as exposed on the wire (deck card lists, suggestion
/// ranking context). Round-trips through the recommendation store, so it
/// also deserializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardOwnership {
    pub is_owned: bool,
    pub owned_quantity: i64,
    pub used_in_decks: i64,
    pub available_quantity: i64,
}

impl CardOwnership {
    /// Figures for a card the user does not own at all.
    pub fn unowned() -> Self {
        Self {
            is_owned: false,
            owned_quantity: 0,
            used_in_decks: 0,
            available_quantity: 0,
        }
    }

    pub fn from_totals(owned: i64, used: i64) -> Self {
        Self {
            is_owned: owned > 0,
            owned_quantity: owned,
            used_in_decks: used,
            available_quantity: owned - used,
        }
    }
}

impl From<PrintOwnership> for CardOwnership {
    fn from(p: PrintOwnership) -> Self {
        Self {
            is_owned: p.owned > 0,
            owned_quantity: p.owned,
            used_in_decks: p.used,
            available_quantity: p.available,
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Per-print availability ledger for one user.
#[derive(Debug, Clone, Default)]
pub struct OwnershipLedger {
    by_print: HashMap<DbId, PrintOwnership>,
}

impl OwnershipLedger {
    /// Build the ledger from owned totals (collection) and used totals
    /// (deck cards), both keyed by card print id.
    ///
    /// `available = owned - used` must never be negative: a used total above
    /// the owned total means collection and decks have drifted apart, which
    /// correct sequencing cannot produce. That case is reported as
    /// [`CoreError::InconsistentState`], never clamped.
    pub fn build(
        owned: impl IntoIterator<Item = (DbId, i64)>,
        used: impl IntoIterator<Item = (DbId, i64)>,
    ) -> Result<Self, CoreError> {
        let mut by_print: HashMap<DbId, PrintOwnership> = HashMap::new();

        for (print_id, quantity) in owned {
            let entry = by_print.entry(print_id).or_insert(PrintOwnership {
                owned: 0,
                used: 0,
                available: 0,
            });
            entry.owned += quantity;
        }
        for (print_id, quantity) in used {
            let entry = by_print.entry(print_id).or_insert(PrintOwnership {
                owned: 0,
                used: 0,
                available: 0,
            });
            entry.used += quantity;
        }

        for (print_id, entry) in by_print.iter_mut() {
            entry.available = entry.owned - entry.used;
            if entry.available < 0 {
                return Err(CoreError::InconsistentState(format!(
                    "print {print_id} has {} owned but {} used in decks",
                    entry.owned, entry.used
                )));
            }
        }

        Ok(Self { by_print })
    }

    /// Figures for one print. Prints absent from both inputs read as zeros.
    pub fn get(&self, card_print_id: DbId) -> PrintOwnership {
        self.by_print
            .get(&card_print_id)
            .copied()
            .unwrap_or(PrintOwnership {
                owned: 0,
                used: 0,
                available: 0,
            })
    }

    pub fn available(&self, card_print_id: DbId) -> i64 {
        self.get(card_print_id).available
    }

    /// Availability map in the shape the statistics aggregator consumes.
    pub fn availability(&self) -> HashMap<DbId, i64> {
        self.by_print
            .iter()
            .map(|(&id, o)| (id, o.available))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn available_is_owned_minus_used() {
        let ledger = OwnershipLedger::build(vec![(1, 4)], vec![(1, 3)]).unwrap();
        let print = ledger.get(1);
        assert_eq!(print.owned, 4);
        assert_eq!(print.used, 3);
        assert_eq!(print.available, 1);
    }

    #[test]
    fn owned_rows_accumulate_across_variants() {
        // Foil and non-foil entries of the same print both count as owned.
        let ledger = OwnershipLedger::build(vec![(1, 2), (1, 3)], vec![]).unwrap();
        assert_eq!(ledger.get(1).owned, 5);
        assert_eq!(ledger.available(1), 5);
    }

    #[test]
    fn used_without_owned_is_inconsistent() {
        let result = OwnershipLedger::build(vec![], vec![(1, 1)]);
        assert_matches!(result, Err(CoreError::InconsistentState(_)));
    }

    #[test]
    fn negative_availability_is_reported_not_clamped() {
        let result = OwnershipLedger::build(vec![(1, 1)], vec![(1, 2)]);
        let err = result.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("1 owned"));
        assert!(message.contains("2 used"));
    }

    #[test]
    fn unknown_print_reads_as_zero() {
        let ledger = OwnershipLedger::build(vec![], vec![]).unwrap();
        assert_eq!(ledger.available(99), 0);
        assert!(!CardOwnership::from(ledger.get(99)).is_owned);
    }

    #[test]
    fn availability_map_matches_ledger() {
        let ledger = OwnershipLedger::build(vec![(1, 4), (2, 1)], vec![(1, 1)]).unwrap();
        let map = ledger.availability();
        assert_eq!(map.get(&1), Some(&3));
        assert_eq!(map.get(&2), Some(&1));
    }

    #[test]
    fn card_ownership_from_totals() {
        let ownership = CardOwnership::from_totals(3, 1);
        assert!(ownership.is_owned);
        assert_eq!(ownership.available_quantity, 2);
        assert!(!CardOwnership::unowned().is_owned);
    }
}
