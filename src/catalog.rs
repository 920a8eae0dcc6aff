use std::sync::Arc;

use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::{Movie, MovieRef};
use crate::omdb::MetadataProvider;
use crate::poster::PosterArchiver;

/// Lazily materializes catalog rows from the metadata provider.
#[derive(Clone)]
pub struct Catalog {
    provider: Arc<dyn MetadataProvider>,
    archiver: PosterArchiver,
}

impl Catalog {
    pub fn new(provider: Arc<dyn MetadataProvider>, archiver: PosterArchiver) -> Self {
        Self { provider, archiver }
    }

    /// Return the catalog row for `movie`, creating it on first reference.
    /// Existing rows are returned as stored, never refreshed.
    pub async fn ensure_movie(&self, db: &SqlitePool, movie: &MovieRef) -> Result<Movie, AppError> {
        if let Some(existing) = find_movie(db, &movie.imdb_id).await? {
            return Ok(existing);
        }

        let meta = self.provider.lookup(&movie.imdb_id).await?;

        let source_poster = meta
            .poster_url
            .or_else(|| movie.poster_url.clone())
            .unwrap_or_default();
        let poster_url = self.archiver.archive(&source_poster, &movie.imdb_id).await;

        let row = Movie {
            imdb_id: movie.imdb_id.clone(),
            title: meta
                .title
                .or_else(|| movie.title.clone())
                .unwrap_or_else(|| movie.imdb_id.clone()),
            year: meta.year.or_else(|| movie.year.clone()),
            runtime: meta.runtime,
            director: meta.director,
            actors: meta.actors,
            genre: meta.genre,
            poster_url: Some(poster_url).filter(|url| !url.is_empty()),
        };

        // A concurrent request may have materialized the same id meanwhile
        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO movies (imdb_id, title, year, runtime, director, actors, genre, poster_url)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.imdb_id)
        .bind(&row.title)
        .bind(&row.year)
        .bind(&row.runtime)
        .bind(&row.director)
        .bind(&row.actors)
        .bind(&row.genre)
        .bind(&row.poster_url)
        .execute(db)
        .await?
        .rows_affected();

        if inserted == 0 {
            if let Some(stored) = find_movie(db, &row.imdb_id).await? {
                return Ok(stored);
            }
        }

        tracing::info!("Added {} ({}) to catalog", row.imdb_id, row.title);
        Ok(row)
    }
}

pub async fn find_movie(db: &SqlitePool, imdb_id: &str) -> Result<Option<Movie>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM movies WHERE imdb_id = ?")
        .bind(imdb_id)
        .fetch_optional(db)
        .await
}
