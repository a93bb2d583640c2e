//! Response envelope shared by all handlers.

use serde::Serialize;

/// The `{ "data": T }` envelope every endpoint responds with.
///
/// Typed instead of an ad-hoc `serde_json::json!({ "data": ... })` so the
/// payload shape is checked at compile time.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
