#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use reelbox::catalog::Catalog;
use reelbox::omdb::{MetadataProvider, MovieMetadata, ProviderError};
use reelbox::poster::{ArchiveError, PosterArchiver, PosterStore};
use reelbox::AppState;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const CREDENTIAL: &str = "test-credential";

/// Metadata provider that knows a fixed set of titles and counts lookups.
#[derive(Default)]
pub struct FakeProvider {
    movies: HashMap<String, MovieMetadata>,
    lookups: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        let mut movies = HashMap::new();
        for (id, title, year) in [
            ("tt0111161", "The Shawshank Redemption", "1994"),
            ("tt0068646", "The Godfather", "1972"),
            ("tt0071562", "The Godfather Part II", "1974"),
        ] {
            movies.insert(
                id.to_string(),
                MovieMetadata {
                    title: Some(title.to_string()),
                    year: Some(year.to_string()),
                    runtime: Some("150 min".to_string()),
                    director: Some("Someone".to_string()),
                    actors: Some("Some Actors".to_string()),
                    genre: Some("Drama".to_string()),
                    poster_url: None,
                },
            );
        }
        Self {
            movies,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn with_poster(mut self, imdb_id: &str, poster_url: &str) -> Self {
        if let Some(meta) = self.movies.get_mut(imdb_id) {
            meta.poster_url = Some(poster_url.to_string());
        }
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    async fn lookup(&self, imdb_id: &str) -> Result<MovieMetadata, ProviderError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.movies
            .get(imdb_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(imdb_id.to_string()))
    }
}

/// Poster store that keeps uploads in memory.
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl PosterStore for MemoryStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, ArchiveError> {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(format!("https://blob.test/{key}"))
    }
}

pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
    pub provider: Arc<FakeProvider>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_provider(FakeProvider::new()).await
    }

    pub async fn with_provider(provider: FakeProvider) -> Self {
        Self::with_pool(memory_pool().await, provider)
    }

    /// Build the app around an already migrated pool.
    pub fn with_pool(pool: SqlitePool, provider: FakeProvider) -> Self {
        let provider = Arc::new(provider);
        let catalog = Catalog::new(
            provider.clone(),
            PosterArchiver::disabled(reqwest::Client::new()),
        );
        let state = AppState {
            db: pool.clone(),
            admin_credential: CREDENTIAL.to_string(),
            catalog,
        };

        let router = reelbox::build_app(state);

        Self {
            router,
            db: pool,
            provider,
        }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// POST a JSON mutation with an optional credential header.
    pub async fn post_with(&self, body: serde_json::Value, credential: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .uri("/lists")
            .method("POST")
            .header("content-type", "application/json");
        if let Some(credential) = credential {
            builder = builder.header("x-admin-credential", credential);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.request(req).await
    }

    /// POST a JSON mutation with the correct credential and expect success.
    pub async fn mutate(&self, body: serde_json::Value) -> serde_json::Value {
        let resp = self.post_with(body, Some(CREDENTIAL)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        body_json(resp).await
    }

    /// Fetch all lists for a user as JSON.
    pub async fn lists(&self, user_id: &str) -> serde_json::Value {
        let resp = self.get(&format!("/lists?userId={}", user_id)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        body_json(resp).await
    }

    pub async fn toggle(&self, user_id: &str, list_type: &str, imdb_id: &str) {
        self.mutate(serde_json::json!({
            "action": "TOGGLE_STANDARD_LIST",
            "userId": user_id,
            "listType": list_type,
            "movie": { "imdb_id": imdb_id },
        }))
        .await;
    }

    pub async fn create_list(&self, user_id: &str, name: &str) -> String {
        let json = self
            .mutate(serde_json::json!({
                "action": "CREATE_LIST",
                "userId": user_id,
                "name": name,
            }))
            .await;
        json["id"].as_str().expect("CREATE_LIST should return an id").to_string()
    }
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}

/// (imdb_id, list_type) pairs from a GET /lists response, sorted.
pub fn standard_memberships(lists: &serde_json::Value) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = lists["standardLists"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| {
            (
                row["imdb_id"].as_str().unwrap().to_string(),
                row["list_type"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    pairs.sort();
    pairs
}
