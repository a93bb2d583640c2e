//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic `?limit=` parameter for bounded listings.
///
/// The bound is clamped in the repository layer.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

/// Tag listing filter (`?tagType=deck`).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagTypeParams {
    pub tag_type: Option<String>,
}
