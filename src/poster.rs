use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use serde::Deserialize;
use tracing::{debug, warn};

/// Archived posters are never wider than this.
pub const MAX_WIDTH: u32 = 400;
pub const JPEG_QUALITY: u8 = 75;
/// Source images larger than this are not downloaded.
pub const MAX_SOURCE_BYTES: usize = 10 * 1024 * 1024;

const NO_IMAGE: &str = "N/A";

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("source returned status {0}")]
    Status(u16),
    #[error("source image exceeds {0} bytes")]
    TooLarge(usize),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("compression task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Durable storage for archived posters.
#[async_trait]
pub trait PosterStore: Send + Sync {
    /// Store `bytes` under `key` and return a publicly readable URL.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, ArchiveError>;
}

/// Blob store reached with an authenticated `PUT {base}/{key}`.
pub struct HttpPosterStore {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
struct PutResponse {
    url: String,
}

impl HttpPosterStore {
    pub fn new(http: reqwest::Client, base_url: String, token: String) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }
}

#[async_trait]
impl PosterStore for HttpPosterStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, ArchiveError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), key);
        let resp: PutResponse = self
            .http
            .put(url)
            .bearer_auth(&self.token)
            .header("content-type", "image/jpeg")
            .header("x-add-random-suffix", "0")
            .body(bytes)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp.url)
    }
}

/// Fetch, recompress and re-host poster images. Every failure degrades to the
/// source URL.
#[derive(Clone)]
pub struct PosterArchiver {
    http: reqwest::Client,
    store: Option<Arc<dyn PosterStore>>,
    max_source_bytes: usize,
}

impl PosterArchiver {
    pub fn new(http: reqwest::Client, store: Option<Arc<dyn PosterStore>>) -> Self {
        Self {
            http,
            store,
            max_source_bytes: MAX_SOURCE_BYTES,
        }
    }

    pub fn with_max_source_bytes(mut self, limit: usize) -> Self {
        self.max_source_bytes = limit;
        self
    }

    /// An archiver with no backing store; `archive` always returns its input.
    pub fn disabled(http: reqwest::Client) -> Self {
        Self::new(http, None)
    }

    pub async fn archive(&self, source_url: &str, imdb_id: &str) -> String {
        if source_url.is_empty() || source_url == NO_IMAGE {
            return source_url.to_string();
        }
        let Some(store) = &self.store else {
            return source_url.to_string();
        };

        match self.try_archive(store.as_ref(), source_url, imdb_id).await {
            Ok(url) => {
                debug!("Archived poster for {imdb_id} at {url}");
                url
            }
            Err(e) => {
                warn!("Poster archival for {imdb_id} failed, keeping source url: {e}");
                source_url.to_string()
            }
        }
    }

    async fn try_archive(
        &self,
        store: &dyn PosterStore,
        source_url: &str,
        imdb_id: &str,
    ) -> Result<String, ArchiveError> {
        let mut resp = self.http.get(source_url).send().await?;
        if !resp.status().is_success() {
            return Err(ArchiveError::Status(resp.status().as_u16()));
        }
        let limit = self.max_source_bytes;
        if resp.content_length().is_some_and(|len| len > limit as u64) {
            return Err(ArchiveError::TooLarge(limit));
        }

        // Content-Length may be absent or wrong, so the cap applies while reading too
        let mut bytes = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            if bytes.len() + chunk.len() > limit {
                return Err(ArchiveError::TooLarge(limit));
            }
            bytes.extend_from_slice(&chunk);
        }

        let compressed = tokio::task::spawn_blocking(move || compress(&bytes)).await??;
        store.put(&storage_key(imdb_id), compressed).await
    }
}

pub fn storage_key(imdb_id: &str) -> String {
    format!("{imdb_id}.jpg")
}

/// Decode any supported format, shrink to `MAX_WIDTH` keeping the aspect
/// ratio, and re-encode as JPEG at `JPEG_QUALITY`.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();

    let img = if width > MAX_WIDTH {
        let scaled = (height as f32 * MAX_WIDTH as f32 / width as f32).round() as u32;
        img.resize_exact(MAX_WIDTH, scaled.max(1), FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buffer = Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)?;
    Ok(buffer.into_inner())
}
