//! HTTP client for the refinement service REST endpoint.

use std::time::Duration;

use crate::messages::{RefineRequest, RefineResponse};

/// HTTP client for a single refinement service instance.
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

/// Errors from the refinement service layer.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The HTTP request itself failed (network, DNS, TLS).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("refinement service error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The request exceeded the configured deadline.
    #[error("refinement request timed out after {0:?}")]
    Timeout(Duration),

    /// The service responded 2xx but the body did not match the contract.
    #[error("failed to parse refinement response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LlmClient {
    /// Create a client for a refinement service instance.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `http://refine:8080`.
    /// * `timeout` - Deadline for one refine call; the engine treats an
    ///   overrun like any other failure and degrades.
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            timeout,
        }
    }

    /// Refine a rule-based suggestion list.
    ///
    /// Sends `POST /v1/refine`. The deadline is enforced here with
    /// [`tokio::time::timeout`] rather than on the reqwest client, so a slow
    /// DNS lookup and a slow model count against the same budget.
    pub async fn refine(&self, request: &RefineRequest) -> Result<RefineResponse, LlmError> {
        tracing::debug!(
            model = %request.model,
            suggestions = request.rule_suggestions.len(),
            "sending refine request"
        );
        let send = async {
            let response = self
                .client
                .post(format!("{}/v1/refine", self.base_url))
                .json(request)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    body,
                });
            }
            Ok(serde_json::from_str::<RefineResponse>(&body)?)
        };

        match tokio::time::timeout(self.timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn unreachable_service_is_a_request_error() {
        // Reserved TEST-NET address, nothing listens there.
        let client = LlmClient::new(
            "http://192.0.2.1:9".to_string(),
            Duration::from_millis(200),
        );
        let request = RefineRequest {
            model: "refine-2".to_string(),
            deck_name: "Test".to_string(),
            format: "commander".to_string(),
            deck_summary: serde_json::json!({}),
            identified_gaps: vec![],
            rule_suggestions: vec![],
        };
        let err = client.refine(&request).await.unwrap_err();
        assert_matches!(err, LlmError::Request(_) | LlmError::Timeout(_));
    }
}
