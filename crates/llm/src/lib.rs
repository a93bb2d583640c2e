//! HTTP client for the recommendation refinement service.
//!
//! The service is a black box behind a JSON contract: the engine sends the
//! deck digest, identified gaps, and rule-based suggestions, and receives
//! refined suggestions with strategic reasoning plus token accounting. Every
//! failure mode here is recoverable; the caller degrades to the rule-only
//! report.

pub mod client;
pub mod messages;

pub use client::{LlmClient, LlmError};
pub use messages::{RefineRequest, RefineResponse, RefinedSuggestion};
