//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the engine can run against a
//! local backend with zero configuration.

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the classifieds backend.
    /// Env: `VITRIN_API_URL`
    /// Default: `http://127.0.0.1:8080`
    pub base_url: String,

    /// Per-request timeout in seconds. Submissions carry tens of megabytes
    /// of media, so this is generous.
    /// Env: `VITRIN_HTTP_TIMEOUT_SECS`
    /// Default: `120`
    pub timeout_secs: u64,

    /// Value of the `User-Agent` header.
    /// Env: `VITRIN_USER_AGENT`
    /// Default: `vitrin/<crate version>`
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 120,
            user_agent: format!("vitrin/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("VITRIN_API_URL") {
            config.base_url = url;
        }

        if let Ok(val) = std::env::var("VITRIN_HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                config.timeout_secs = secs;
            } else {
                tracing::warn!(
                    value = %val,
                    "Invalid VITRIN_HTTP_TIMEOUT_SECS, using default"
                );
            }
        }

        if let Ok(agent) = std::env::var("VITRIN_USER_AGENT") {
            if !agent.is_empty() {
                config.user_agent = agent;
            }
        }

        config
    }
}
