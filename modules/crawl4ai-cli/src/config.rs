use tracing::info;

const DEFAULT_BASE_URL: &str = "http://localhost:11235";

/// Process-wide configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the crawl service.
    pub base_url: String,
    /// Bearer credential for the service. Absent means requests go out
    /// without an `Authorization` header.
    pub api_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("CRAWL4AI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_token: std::env::var("CRAWL4AI_API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
        }
    }

    /// Log what was loaded, with the credential redacted.
    pub fn log_keys(&self) {
        info!("Config loaded:");
        info!("  CRAWL4AI_BASE_URL: {}", self.base_url);
        info!("  CRAWL4AI_API_TOKEN: {}", preview(&self.api_token));
    }
}

// Char-based prefix, a token may hold multi-byte text.
fn preview(val: &Option<String>) -> String {
    match val {
        Some(v) => {
            let prefix: String = v.chars().take(5).collect();
            format!("{}...({} chars)", prefix, v.chars().count())
        }
        None => "<not set>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test touches both variables so nothing races on process env.
    #[test]
    fn env_round_trip() {
        std::env::remove_var("CRAWL4AI_BASE_URL");
        std::env::remove_var("CRAWL4AI_API_TOKEN");
        let config = Config::from_env();
        assert_eq!(config.base_url, "http://localhost:11235");
        assert!(config.api_token.is_none());

        std::env::set_var("CRAWL4AI_BASE_URL", "http://crawler:9000/");
        std::env::set_var("CRAWL4AI_API_TOKEN", "secret");
        let config = Config::from_env();
        assert_eq!(config.base_url, "http://crawler:9000/");
        assert_eq!(config.api_token.as_deref(), Some("secret"));

        std::env::set_var("CRAWL4AI_API_TOKEN", "");
        let config = Config::from_env();
        assert!(config.api_token.is_none());

        std::env::remove_var("CRAWL4AI_BASE_URL");
        std::env::remove_var("CRAWL4AI_API_TOKEN");
    }

    #[test]
    fn token_preview_is_redacted_and_multibyte_safe() {
        assert_eq!(
            preview(&Some("secret-token".to_string())),
            "secre...(12 chars)"
        );
        assert_eq!(
            preview(&Some("späße-geheim".to_string())),
            "späße...(12 chars)"
        );
        assert_eq!(preview(&None), "<not set>");
    }
}
