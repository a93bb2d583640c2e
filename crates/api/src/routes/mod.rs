pub mod cards;
pub mod collection;
pub mod deck_cards;
pub mod decks;
pub mod folders;
pub mod health;
pub mod recommendations;
pub mod sections;
pub mod tags;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users/{id}                                    get, patch
/// /users/{id}/preferences                        get, patch
///
/// /users/{id}/collection                         list, add
/// /users/{id}/collection/stats                   aggregate statistics
/// /users/{id}/collection/{entry_id}              patch, delete (body = quantity)
/// /users/{id}/collection/bulk/move               move entries to a folder
/// /users/{id}/collection/bulk/tags               attach tags to entries
///
/// /users/{id}/folders                            list, create
/// /users/{id}/folders/{fid}                      patch, delete
/// /users/{id}/tags                               list, create
/// /users/{id}/tags/{tag_id}                      patch, delete
///
/// /users/{id}/decks                              list, create
/// /decks/{deck_id}                               get, patch, delete
/// /decks/{deck_id}/clone                         copy deck (POST)
/// /decks/{deck_id}/stats                         aggregate statistics
///
/// /decks/{deck_id}/sections                      list, create
/// /decks/{deck_id}/sections/reorder              reorder (POST)
/// /sections/{sid}                                patch, delete
/// /sections/{sid}/cards/reorder                  reorder cards (POST)
///
/// /decks/{deck_id}/cards                         list, add
/// /decks/{deck_id}/cards/bulk                    all-or-nothing batch add
/// /deck-cards/{id}                               patch, delete
/// /deck-cards/{id}/move                          move across sections (POST)
///
/// /recommendations                               generate/serve (POST)
/// /recommendations/{id}/feedback                 record feedback (POST)
/// /decks/{deck_id}/recommendations               history summaries
/// /decks/{deck_id}/recommendations/current       servable report
///
/// /cards/search                                  catalog search
/// /cards/{oracle_id}                             rules identity
/// /cards/{oracle_id}/prints                      printings
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(collection::router())
        .merge(folders::router())
        .merge(tags::router())
        .merge(decks::router())
        .merge(sections::router())
        .merge(deck_cards::router())
        .merge(recommendations::router())
        .merge(cards::router())
}
