use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Movie;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum ListKind {
    #[serde(rename = "watchlist")]
    #[sqlx(rename = "watchlist")]
    Watchlist,
    #[serde(rename = "watched")]
    #[sqlx(rename = "watched")]
    Watched,
    #[serde(rename = "favourites")]
    #[sqlx(rename = "favourites")]
    Favourites,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListKind::Watchlist => write!(f, "watchlist"),
            ListKind::Watched => write!(f, "watched"),
            ListKind::Favourites => write!(f, "favourites"),
        }
    }
}

/// One (movie, list kind) membership for a user, with the movie's catalog
/// columns flattened alongside.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StandardListRow {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub movie: Movie,
    pub list_type: ListKind,
    pub user_rating: Option<i64>,
    pub date_added: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomList {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub date_created: String,
}

impl CustomList {
    pub fn new(user_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            name: name.trim().to_string(),
            date_created: Utc::now().to_rfc3339(),
        }
    }
}

/// One (list, movie) pair from the custom list join. Empty lists still
/// produce a single row with every movie column null.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomListRow {
    pub list_id: String,
    pub list_name: String,
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    pub year: Option<String>,
    pub runtime: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
    pub date_added: Option<String>,
}
