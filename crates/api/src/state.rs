use std::sync::Arc;

use deckforge_llm::LlmClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: deckforge_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Refinement service client. `None` when `LLM_ENABLED=false`; the
    /// recommendation engine then serves rule-only reports.
    pub llm: Option<LlmClient>,
}

impl AppState {
    /// Assemble state from a pool and loaded configuration.
    pub fn new(pool: deckforge_db::DbPool, config: ServerConfig) -> Self {
        let llm = config.recommendation.llm_enabled.then(|| {
            LlmClient::new(
                config.recommendation.llm_base_url.clone(),
                std::time::Duration::from_secs(config.recommendation.llm_timeout_secs),
            )
        });
        Self {
            pool,
            config: Arc::new(config),
            llm,
        }
    }
}
