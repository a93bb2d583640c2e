//! Recommendation generation pipeline.
//!
//! Pulls the deck and the caller's ownership projection, runs gap analysis,
//! turns catalog candidates into ranked suggestions, optionally refines them
//! through the language-model service, and persists the report. Generation
//! never takes a deck-wide lock; persistence is its own small transaction,
//! and a stale report is simply superseded by a newer row.

use std::collections::{BTreeSet, HashMap, HashSet};

use deckforge_core::card::{parse_colors, Currency};
use deckforge_core::error::CoreError;
use deckforge_core::gaps::{self, DeckGap, ALGORITHM_VERSION};
use deckforge_core::ownership::CardOwnership;
use deckforge_core::recommend::{priority_for, rank_suggestions, CardSummary, RuleSuggestion};
use deckforge_core::stats;
use deckforge_core::types::DbId;
use deckforge_db::models::card::ResolvedPrint;
use deckforge_db::models::deck::Deck;
use deckforge_db::models::recommendation::{
    DeckRecommendation, NewRecommendation, RequestRecommendation,
};
use deckforge_db::repositories::{
    CatalogRepo, DeckCardRepo, DeckRepo, OwnershipRepo, RecommendationRepo, UserRepo,
};
use deckforge_llm::RefineRequest;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Cap on suggestions per identified gap, applied before ranking.
pub const MAX_SUGGESTIONS_PER_GAP: usize = 5;

/// Produce the servable recommendation for a deck.
///
/// Serves the cached report when one exists for the deck's current version
/// and has not expired; otherwise generates, persists, and returns a fresh
/// one. `force_refresh` skips the cache read.
pub async fn generate(
    state: &AppState,
    user_id: DbId,
    request: &RequestRecommendation,
) -> AppResult<DeckRecommendation> {
    let deck = DeckRepo::find_by_id(&state.pool, user_id, request.deck_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Deck",
            id: request.deck_id,
        }))?;

    if !request.force_refresh {
        if let Some(existing) =
            RecommendationRepo::find_current(&state.pool, deck.id, deck.version).await?
        {
            tracing::debug!(deck_id = deck.id, recommendation_id = existing.id, "serving cached recommendation");
            return Ok(existing);
        }
    }

    let report = build_report(state, user_id, &deck, request).await?;
    let stored = RecommendationRepo::insert(&state.pool, &report).await?;
    tracing::info!(
        deck_id = deck.id,
        recommendation_id = stored.id,
        llm_refined = stored.llm_refined(),
        "generated recommendation"
    );
    Ok(stored)
}

/// Run the analysis and synthesis stages for one deck.
async fn build_report(
    state: &AppState,
    user_id: DbId,
    deck: &Deck,
    request: &RequestRecommendation,
) -> AppResult<NewRecommendation> {
    let format = deckforge_core::card::Format::from_name(&deck.format).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "deck has unknown format '{}'",
            deck.format
        )))
    })?;

    // -- Analysis --
    let details = DeckCardRepo::list_for_deck(&state.pool, deck.id).await?;
    let resolved: Vec<_> = details.iter().map(|d| d.to_resolved()).collect();
    let ledger = OwnershipRepo::build_ledger(&state.pool, user_id, Some(deck.id)).await?;
    let deck_stats = stats::aggregate(&resolved, &ledger.availability());
    let counts = gaps::count_categories(&resolved);
    let identified_gaps = gaps::analyze(&deck_stats, &counts, format);

    // -- Candidate lookup --
    let color_identity: Vec<String> = resolved
        .iter()
        .flat_map(|card| card.colors.iter().map(|c| c.as_letter().to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let in_deck: Vec<_> = resolved
        .iter()
        .map(|card| card.oracle_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let candidates = if identified_gaps.is_empty() {
        Vec::new()
    } else {
        CatalogRepo::recommendation_candidates(
            &state.pool,
            &deck.format,
            Some(color_identity.as_slice()),
            request.max_price_per_card,
            &in_deck,
        )
        .await?
    };

    // -- Ranking --
    let ownership = if request.consider_collection {
        OwnershipRepo::ownership_by_oracle(&state.pool, user_id).await?
    } else {
        HashMap::new()
    };
    let preferences = UserRepo::get_or_init_preferences(&state.pool, user_id).await?;
    let currency = Currency::from_name(&preferences.default_currency).unwrap_or(Currency::Usd);

    let mut suggestions =
        synthesize(&identified_gaps, &candidates, &ownership, currency);
    rank_suggestions(&mut suggestions);

    let mut report = NewRecommendation {
        deck_id: deck.id,
        deck_version: deck.version,
        algorithm_version: ALGORITHM_VERSION.to_string(),
        identified_gaps: to_json(&identified_gaps)?,
        rule_suggestions: to_json(&suggestions)?,
        llm_model: None,
        llm_prompt_tokens: None,
        llm_completion_tokens: None,
        llm_cost_usd: None,
        llm_suggestions: None,
        llm_summary: None,
        ttl_hours: state.config.recommendation.ttl_hours,
    };

    // -- Refinement --
    // Any failure here degrades to the rule-only report; the HTTP caller
    // never sees a refinement error.
    if request.use_llm && !suggestions.is_empty() {
        if let Some(client) = &state.llm {
            let refine = RefineRequest {
                model: state.config.recommendation.llm_model.clone(),
                deck_name: deck.name.clone(),
                format: deck.format.clone(),
                deck_summary: to_json(&deck_stats)?,
                identified_gaps: identified_gaps.clone(),
                rule_suggestions: suggestions.clone(),
            };
            match client.refine(&refine).await {
                Ok(response) => {
                    report.llm_suggestions = Some(to_json(&response.suggestions)?);
                    report.llm_summary = Some(response.summary);
                    report.llm_model = Some(response.model);
                    report.llm_prompt_tokens = response.prompt_tokens;
                    report.llm_completion_tokens = response.completion_tokens;
                    report.llm_cost_usd = response.cost_usd;
                }
                Err(err) => {
                    tracing::warn!(deck_id = deck.id, error = %err, "refinement failed, serving rule-only report");
                }
            }
        }
    }

    Ok(report)
}

/// Match candidates against identified gaps and attach priority, ownership,
/// and display price. A candidate addressing several gaps is suggested once,
/// for the first gap that claims it.
fn synthesize(
    identified_gaps: &[DeckGap],
    candidates: &[ResolvedPrint],
    ownership: &HashMap<uuid::Uuid, CardOwnership>,
    currency: Currency,
) -> Vec<RuleSuggestion> {
    let mut suggestions = Vec::new();
    let mut claimed: HashSet<uuid::Uuid> = HashSet::new();

    for gap in identified_gaps {
        let mut taken = 0;
        for candidate in candidates {
            if taken == MAX_SUGGESTIONS_PER_GAP {
                break;
            }
            if claimed.contains(&candidate.oracle_id) {
                continue;
            }
            let roles =
                gaps::categorize_card(&candidate.type_line, candidate.oracle_text.as_deref());
            if !roles.contains(&gap.category) {
                continue;
            }

            let owned = ownership
                .get(&candidate.oracle_id)
                .copied()
                .unwrap_or_else(CardOwnership::unowned);
            let price = candidate
                .prices()
                .best(currency, candidate.foil_only())
                .map(|value| format!("{value:.2}"));

            claimed.insert(candidate.oracle_id);
            taken += 1;
            suggestions.push(RuleSuggestion {
                card: CardSummary {
                    oracle_id: candidate.oracle_id,
                    name: candidate.name.clone(),
                    mana_cost: candidate.mana_cost.clone(),
                    type_line: candidate.type_line.clone(),
                    colors: parse_colors(&candidate.colors),
                    cmc: f64::from(candidate.cmc),
                },
                reason: format!("adds {}: {}", gap.category.label(), gap.description),
                priority: priority_for(gap.severity, owned.available_quantity > 0),
                addresses_gap: Some(gap.category),
                ownership: owned,
                price,
            });
        }
    }

    suggestions
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AppError::InternalError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckforge_core::gaps::{GapCategory, GapSeverity};
    use deckforge_core::recommend::SuggestionPriority;

    fn gap(category: GapCategory, severity: GapSeverity) -> DeckGap {
        DeckGap {
            category,
            severity,
            description: "test gap".to_string(),
        }
    }

    fn candidate(name: &str, type_line: &str, oracle_text: &str, price: &str) -> ResolvedPrint {
        ResolvedPrint {
            print_id: 1,
            oracle_id: uuid::Uuid::new_v4(),
            name: name.to_string(),
            mana_cost: Some("{1}{G}".to_string()),
            type_line: type_line.to_string(),
            oracle_text: Some(oracle_text.to_string()),
            colors: vec!["G".to_string()],
            cmc: 2.0,
            legalities: serde_json::json!({}),
            set_code: "tst".to_string(),
            foil: false,
            nonfoil: true,
            price_usd: Some(price.to_string()),
            price_usd_foil: None,
            price_eur: None,
            price_eur_foil: None,
        }
    }

    #[test]
    fn candidates_match_their_gap_category() {
        let gaps = vec![gap(GapCategory::Ramp, GapSeverity::High)];
        let candidates = vec![
            candidate("Rampant Growth", "Sorcery", "Search your library for a basic land card and put it onto the battlefield", "0.50"),
            candidate("Shock", "Instant", "Shock deals 2 damage to any target", "0.10"),
        ];
        let suggestions = synthesize(&gaps, &candidates, &HashMap::new(), Currency::Usd);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].card.name, "Rampant Growth");
        assert_eq!(suggestions[0].addresses_gap, Some(GapCategory::Ramp));
        assert_eq!(suggestions[0].priority, SuggestionPriority::High);
        assert_eq!(suggestions[0].price.as_deref(), Some("0.50"));
    }

    #[test]
    fn owned_candidates_rank_a_step_higher() {
        let gaps = vec![gap(GapCategory::Removal, GapSeverity::Medium)];
        let candidates = vec![candidate(
            "Murder",
            "Instant",
            "Destroy target creature",
            "0.25",
        )];
        let mut ownership = HashMap::new();
        ownership.insert(candidates[0].oracle_id, CardOwnership::from_totals(2, 0));

        let suggestions = synthesize(&gaps, &candidates, &ownership, Currency::Usd);
        assert_eq!(suggestions[0].priority, SuggestionPriority::High);
        assert!(suggestions[0].ownership.is_owned);
    }

    #[test]
    fn a_candidate_is_claimed_by_one_gap_only() {
        let gaps = vec![
            gap(GapCategory::Interaction, GapSeverity::Low),
            gap(GapCategory::Protection, GapSeverity::Low),
        ];
        // Fills both gaps: counterspell text plus hexproof.
        let candidates = vec![candidate(
            "Spellguard",
            "Instant",
            "Counter target spell. Creatures you control gain hexproof until end of turn",
            "0.05",
        )];
        let suggestions = synthesize(&gaps, &candidates, &HashMap::new(), Currency::Usd);
        assert_eq!(suggestions.len(), 1);
    }

    #[test]
    fn per_gap_cap_is_enforced() {
        let gaps = vec![gap(GapCategory::Removal, GapSeverity::High)];
        let candidates: Vec<_> = (0..10)
            .map(|i| {
                candidate(
                    &format!("Removal {i}"),
                    "Instant",
                    "Destroy target creature",
                    "0.10",
                )
            })
            .collect();
        let suggestions = synthesize(&gaps, &candidates, &HashMap::new(), Currency::Usd);
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS_PER_GAP);
    }
}
