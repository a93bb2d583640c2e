//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the corresponding repository in `deckforge_db` and
//! map errors via [`crate::error::AppError`]; the only handler with real
//! orchestration logic is `recommendations`, which drives
//! [`crate::engine::recommend`].

pub mod cards;
pub mod collection;
pub mod deck_cards;
pub mod decks;
pub mod folders;
pub mod recommendations;
pub mod sections;
pub mod tags;
pub mod users;
