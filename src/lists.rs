//! Standard and custom list membership queries.
//!
//! None of these run inside a transaction. A crash between removing the
//! watchlist row and inserting the watched row in `toggle_standard` leaves
//! the movie in neither list.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{CustomList, CustomListRow, ListKind, StandardListRow};

/// Flip membership of `imdb_id` in the user's `kind` list. Returns whether the
/// movie is in the list afterwards. Adding to `watched` drops it from the
/// watchlist.
pub async fn toggle_standard(
    db: &SqlitePool,
    user_id: &str,
    imdb_id: &str,
    kind: ListKind,
) -> Result<bool, sqlx::Error> {
    let existing: Option<(i64,)> = sqlx::query_as(
        "SELECT 1 FROM user_movies WHERE user_id = ? AND movie_imdb_id = ? AND list_type = ?",
    )
    .bind(user_id)
    .bind(imdb_id)
    .bind(kind)
    .fetch_optional(db)
    .await?;

    if existing.is_some() {
        sqlx::query("DELETE FROM user_movies WHERE user_id = ? AND movie_imdb_id = ? AND list_type = ?")
            .bind(user_id)
            .bind(imdb_id)
            .bind(kind)
            .execute(db)
            .await?;
        return Ok(false);
    }

    if kind == ListKind::Watched {
        sqlx::query("DELETE FROM user_movies WHERE user_id = ? AND movie_imdb_id = ? AND list_type = ?")
            .bind(user_id)
            .bind(imdb_id)
            .bind(ListKind::Watchlist)
            .execute(db)
            .await?;
    }

    // A concurrent add of the same tuple may land between the check and here
    sqlx::query(
        "INSERT OR IGNORE INTO user_movies (user_id, movie_imdb_id, list_type, date_added) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(imdb_id)
    .bind(kind)
    .bind(Utc::now().to_rfc3339())
    .execute(db)
    .await?;

    Ok(true)
}

/// Set or clear the rating on an existing membership row. Returns false when
/// the movie is not in that list.
pub async fn set_rating(
    db: &SqlitePool,
    user_id: &str,
    imdb_id: &str,
    kind: ListKind,
    rating: Option<u8>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE user_movies SET user_rating = ? WHERE user_id = ? AND movie_imdb_id = ? AND list_type = ?",
    )
    .bind(rating.map(i64::from))
    .bind(user_id)
    .bind(imdb_id)
    .bind(kind)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn standard_rows(db: &SqlitePool, user_id: &str) -> Result<Vec<StandardListRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT m.*, um.list_type, um.user_rating, um.date_added
        FROM user_movies um
        JOIN movies m ON um.movie_imdb_id = m.imdb_id
        WHERE um.user_id = ?
        ORDER BY um.date_added DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn create_list(db: &SqlitePool, list: &CustomList) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO custom_lists (id, user_id, name, date_created) VALUES (?, ?, ?, ?)")
        .bind(&list.id)
        .bind(&list.user_id)
        .bind(&list.name)
        .bind(&list.date_created)
        .execute(db)
        .await?;
    Ok(())
}

/// Delete a list owned by `user_id`. Memberships go with it through the
/// foreign key cascade. Returns false when no such list exists for the user.
pub async fn delete_list(db: &SqlitePool, user_id: &str, list_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM custom_lists WHERE id = ? AND user_id = ?")
        .bind(list_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find_list(
    db: &SqlitePool,
    user_id: &str,
    list_id: &str,
) -> Result<Option<CustomList>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM custom_lists WHERE id = ? AND user_id = ?")
        .bind(list_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
}

/// Returns false if the movie was already in the list.
pub async fn add_to_list(db: &SqlitePool, list_id: &str, imdb_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO custom_movie_lists (list_id, movie_imdb_id, date_added) VALUES (?, ?, ?)",
    )
    .bind(list_id)
    .bind(imdb_id)
    .bind(Utc::now().to_rfc3339())
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn remove_from_list(db: &SqlitePool, list_id: &str, imdb_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM custom_movie_lists WHERE list_id = ? AND movie_imdb_id = ?")
        .bind(list_id)
        .bind(imdb_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn custom_rows(db: &SqlitePool, user_id: &str) -> Result<Vec<CustomListRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT cl.id AS list_id, cl.name AS list_name,
               m.imdb_id, m.title, m.year, m.runtime, m.director, m.actors, m.genre, m.poster_url,
               cml.date_added
        FROM custom_lists cl
        LEFT JOIN custom_movie_lists cml ON cl.id = cml.list_id
        LEFT JOIN movies m ON cml.movie_imdb_id = m.imdb_id
        WHERE cl.user_id = ?
        ORDER BY cl.date_created, cml.date_added DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}
