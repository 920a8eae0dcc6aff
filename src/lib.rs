pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod lists;
pub mod models;
pub mod omdb;
pub mod poster;
pub mod routes;

use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::SqlitePool;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::omdb::OmdbClient;
use crate::poster::{HttpPosterStore, PosterArchiver, PosterStore};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub admin_credential: String,
    pub catalog: Catalog,
}

impl AppState {
    /// Wire the production collaborators described by `config` around `db`.
    pub fn from_config(db: SqlitePool, config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let provider = Arc::new(OmdbClient::new(
            http.clone(),
            config.omdb_base_url.clone(),
            config.omdb_api_key.clone(),
        ));

        let store = config.blob.as_ref().map(|blob| {
            Arc::new(HttpPosterStore::new(http.clone(), blob.base_url.clone(), blob.token.clone()))
                as Arc<dyn PosterStore>
        });
        if store.is_none() {
            tracing::warn!("No blob store configured, posters will not be archived");
        }

        Ok(Self {
            db,
            admin_credential: config.admin_credential.clone(),
            catalog: Catalog::new(provider, PosterArchiver::new(http, store)),
        })
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Build the full Axum application router.
///
/// Caller is responsible for running database migrations on the pool in
/// `state` beforehand.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::lists::router())
        .merge(routes::export::router())
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
