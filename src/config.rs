use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct BlobConfig {
    pub base_url: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub admin_credential: String,
    pub omdb_api_key: String,
    pub omdb_base_url: String,
    /// Poster archival is disabled when absent.
    pub blob: Option<BlobConfig>,
    pub http_timeout: Duration,
}

impl Config {
    /// Read configuration from the process environment. Call
    /// `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("BIND_ADDR") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "BIND_ADDR", value: v })?,
            None => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.parse()
                    .map_err(|_| ConfigError::Invalid { key: "HTTP_TIMEOUT_SECS", value: v })?,
            ),
            None => Duration::from_secs(10),
        };

        let blob = match (get("BLOB_BASE_URL"), get("BLOB_TOKEN")) {
            (Some(base_url), Some(token)) => Some(BlobConfig { base_url, token }),
            _ => None,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| "sqlite:data/reelbox.db".to_string()),
            bind_addr,
            admin_credential: get("ADMIN_CREDENTIAL").ok_or(ConfigError::Missing("ADMIN_CREDENTIAL"))?,
            omdb_api_key: get("OMDB_API_KEY").ok_or(ConfigError::Missing("OMDB_API_KEY"))?,
            omdb_base_url: get("OMDB_BASE_URL").unwrap_or_else(|| "https://www.omdbapi.com/".to_string()),
            blob,
            http_timeout,
        })
    }
}
