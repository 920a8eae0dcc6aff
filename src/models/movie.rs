use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog row. Created once on first reference and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub imdb_id: String,
    pub title: String,
    pub year: Option<String>,
    pub runtime: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
}

/// Movie reference as sent by the client. Only `imdb_id` is required; the
/// rest are search-result hints used when the metadata provider has gaps.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieRef {
    pub imdb_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
}

impl MovieRef {
    pub fn new(imdb_id: impl Into<String>) -> Self {
        Self {
            imdb_id: imdb_id.into(),
            title: None,
            year: None,
            poster_url: None,
        }
    }
}

/// External ids double as storage keys, so they are restricted to a short
/// run of ASCII alphanumerics.
pub fn is_valid_imdb_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 20 && id.bytes().all(|b| b.is_ascii_alphanumeric())
}
