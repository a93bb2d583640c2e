/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Recommendation generation settings (TTL, refinement service).
    pub recommendation: RecommendationConfig,
}

/// Settings for the recommendation engine and its refinement service.
#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    /// Hours a generated report is served from cache (default: `24`).
    pub ttl_hours: i64,
    /// Whether the refinement stage runs at all (default: `true`).
    /// Requests can still opt out per call via `useLlm: false`.
    pub llm_enabled: bool,
    /// Base URL of the refinement service (default: `http://localhost:8080`).
    pub llm_base_url: String,
    /// Model name passed to the refinement service.
    pub llm_model: String,
    /// Deadline for one refine call in seconds (default: `20`).
    pub llm_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                    |
    /// |-----------------------------|----------------------------|
    /// | `HOST`                      | `0.0.0.0`                  |
    /// | `PORT`                      | `3000`                     |
    /// | `CORS_ORIGINS`              | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                       |
    /// | `RECOMMENDATION_TTL_HOURS`  | `24`                       |
    /// | `LLM_ENABLED`               | `true`                     |
    /// | `LLM_BASE_URL`              | `http://localhost:8080`    |
    /// | `LLM_MODEL`                 | `claude-sonnet-4`          |
    /// | `LLM_TIMEOUT_SECS`          | `20`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            recommendation: RecommendationConfig::from_env(),
        }
    }
}

impl RecommendationConfig {
    pub fn from_env() -> Self {
        let ttl_hours: i64 = std::env::var("RECOMMENDATION_TTL_HOURS")
            .unwrap_or_else(|_| "24".into())
            .parse()
            .expect("RECOMMENDATION_TTL_HOURS must be a valid i64");

        let llm_enabled: bool = std::env::var("LLM_ENABLED")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("LLM_ENABLED must be true or false");

        let llm_base_url =
            std::env::var("LLM_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into());

        let llm_model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "claude-sonnet-4".into());

        let llm_timeout_secs: u64 = std::env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("LLM_TIMEOUT_SECS must be a valid u64");

        Self {
            ttl_hours,
            llm_enabled,
            llm_base_url,
            llm_model,
            llm_timeout_secs,
        }
    }
}
