//! Pure domain logic for the deck and collection engine.
//!
//! This crate contains no I/O: the database layer loads state, passes it
//! into these functions, and commits only what they accept. Everything here
//! is deterministic and unit-tested in isolation.

pub mod card;
pub mod composition;
pub mod error;
pub mod gaps;
pub mod merge;
pub mod ownership;
pub mod recommend;
pub mod section_templates;
pub mod stats;
pub mod types;
