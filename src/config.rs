use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// API key for the price oracle. Absent means the oracle path is skipped
    /// entirely and every search is served from the mock generator.
    pub oracle_api_key: Option<String>,
    pub oracle_base_url: String,
    pub oracle_model: String,
    /// Upper bound on one oracle call, in seconds. A timeout is handled the
    /// same way as a malformed response.
    pub oracle_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            oracle_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            oracle_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            oracle_model: std::env::var("OPENAI_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            oracle_timeout_secs: std::env::var("ORACLE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("ORACLE_TIMEOUT_SECS must be a positive number"))?,
        };

        if !config.oracle_base_url.starts_with("http://")
            && !config.oracle_base_url.starts_with("https://")
        {
            anyhow::bail!("OPENAI_BASE_URL must start with http:// or https://");
        }
        if config.oracle_timeout_secs == 0 {
            anyhow::bail!("ORACLE_TIMEOUT_SECS must be greater than zero");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Oracle base URL: {}", config.oracle_base_url);
        tracing::debug!("Oracle model: {}", config.oracle_model);
        if config.oracle_api_key.is_none() {
            tracing::warn!("No oracle API key configured; serving mock data only");
        }
        tracing::debug!("Server port: {}", config.port);

        Ok(config)
    }
}
