use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend-as-a-service. When unset the demo binary
    /// falls back to the seeded in-memory adapter.
    pub backend_url: Option<String>,
    pub backend_api_key: String,
    pub ai_local_endpoint: String,
    pub ai_hosted_endpoint: Option<String>,
    pub ai_use_local: bool,
    /// Seconds between change-feed polls.
    pub poll_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let ai_use_local = env::var("AI_USE_LOCAL")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        Self {
            backend_url: env::var("BACKEND_URL").ok(),
            backend_api_key: env::var("BACKEND_API_KEY").unwrap_or_default(),
            ai_local_endpoint: env::var("AI_LOCAL_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            ai_hosted_endpoint: env::var("AI_HOSTED_ENDPOINT").ok(),
            ai_use_local,
            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Which AI endpoint to call: the hosted one only when explicitly
    /// selected and configured, the local one otherwise.
    pub fn ai_endpoint(&self) -> &str {
        if !self.ai_use_local {
            if let Some(hosted) = &self.ai_hosted_endpoint {
                return hosted;
            }
        }
        &self.ai_local_endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_endpoint_prefers_local_unless_hosted_selected() {
        let mut config = Config {
            backend_url: None,
            backend_api_key: String::new(),
            ai_local_endpoint: "http://localhost:9000".to_string(),
            ai_hosted_endpoint: Some("https://ai.example.com".to_string()),
            ai_use_local: true,
            poll_interval_secs: 10,
        };
        assert_eq!(config.ai_endpoint(), "http://localhost:9000");

        config.ai_use_local = false;
        assert_eq!(config.ai_endpoint(), "https://ai.example.com");

        config.ai_hosted_endpoint = None;
        assert_eq!(config.ai_endpoint(), "http://localhost:9000");
    }
}
