use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

/// Metadata for a single title as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieMetadata {
    pub title: Option<String>,
    pub year: Option<String>,
    pub runtime: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no match for {0}")]
    NotFound(String),
    #[error("metadata provider rejected request: {0}")]
    Rejected(String),
    #[error("metadata request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid provider url: {0}")]
    Url(#[from] url::ParseError),
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn lookup(&self, imdb_id: &str) -> Result<MovieMetadata, ProviderError>;
}

pub struct OmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(http: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl MetadataProvider for OmdbClient {
    async fn lookup(&self, imdb_id: &str) -> Result<MovieMetadata, ProviderError> {
        let url = Url::parse_with_params(&self.base_url, &[("i", imdb_id), ("apikey", self.api_key.as_str())])?;
        let body: OmdbResponse = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        body.into_metadata(imdb_id)
    }
}

#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Runtime")]
    runtime: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Actors")]
    actors: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

impl OmdbResponse {
    fn into_metadata(self, imdb_id: &str) -> Result<MovieMetadata, ProviderError> {
        if self.response != "True" {
            return match self.error {
                // OMDb reports unknown ids and bad keys through the same field
                Some(e) if e.contains("API key") => Err(ProviderError::Rejected(e)),
                _ => Err(ProviderError::NotFound(imdb_id.to_string())),
            };
        }
        Ok(MovieMetadata {
            title: present(self.title),
            year: present(self.year),
            runtime: present(self.runtime),
            director: present(self.director),
            actors: present(self.actors),
            genre: present(self.genre),
            poster_url: present(self.poster),
        })
    }
}

/// OMDb fills unknown fields with "N/A".
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "N/A")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<MovieMetadata, ProviderError> {
        let resp: OmdbResponse = serde_json::from_str(json).unwrap();
        resp.into_metadata("tt0111161")
    }

    #[test]
    fn parses_full_record() {
        let meta = parse(
            r#"{"Title":"The Shawshank Redemption","Year":"1994","Runtime":"142 min",
                "Director":"Frank Darabont","Actors":"Tim Robbins, Morgan Freeman",
                "Genre":"Drama","Poster":"https://img.example/p.jpg","Response":"True"}"#,
        )
        .unwrap();
        assert_eq!(meta.title.as_deref(), Some("The Shawshank Redemption"));
        assert_eq!(meta.runtime.as_deref(), Some("142 min"));
        assert_eq!(meta.poster_url.as_deref(), Some("https://img.example/p.jpg"));
    }

    #[test]
    fn na_fields_are_absent() {
        let meta = parse(r#"{"Title":"Obscure","Poster":"N/A","Director":"N/A","Response":"True"}"#)
            .unwrap();
        assert_eq!(meta.title.as_deref(), Some("Obscure"));
        assert!(meta.poster_url.is_none());
        assert!(meta.director.is_none());
    }

    #[test]
    fn false_response_is_not_found() {
        let err = parse(r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#).unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(id) if id == "tt0111161"));
    }

    #[test]
    fn bad_key_is_rejected() {
        let err = parse(r#"{"Response":"False","Error":"Invalid API key!"}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Rejected(_)));
    }
}
