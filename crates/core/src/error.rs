use crate::composition::CompositionViolation;
use crate::types::DbId;

/// Domain error taxonomy. Everything above `core` maps these onto its own
/// transport (HTTP status codes, log severity).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A deck composition rule rejected a proposed mutation. Nothing was
    /// committed.
    #[error("Composition rule violated: {0}")]
    RuleViolation(CompositionViolation),

    /// A bulk operation referenced ids that do not resolve. The whole
    /// operation was rejected; no row was touched.
    #[error("{entity} ids not found: {failed_ids:?}")]
    PartialFailure {
        entity: &'static str,
        failed_ids: Vec<DbId>,
    },

    /// The ownership ledger observed a state that correct sequencing can
    /// never produce (e.g. negative availability). Reported, never corrected
    /// silently.
    #[error("Inconsistent state: {0}")]
    InconsistentState(String),
}

impl From<CompositionViolation> for CoreError {
    fn from(violation: CompositionViolation) -> Self {
        Self::RuleViolation(violation)
    }
}
