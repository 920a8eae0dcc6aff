use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::AppError;
use crate::lists;
use crate::models::{CustomListRow, Movie, StandardListRow};
use crate::routes::lists::UserQuery;
use crate::AppState;

#[derive(Serialize)]
struct ExportMovie {
    #[serde(flatten)]
    movie: Movie,
    user_rating: Option<i64>,
    date_added: String,
}

#[derive(Serialize, Default)]
struct ExportStandardLists {
    watchlist: Vec<ExportMovie>,
    watched: Vec<ExportMovie>,
    favourites: Vec<ExportMovie>,
}

#[derive(Serialize)]
struct ExportCustomList {
    id: String,
    name: String,
    movies: Vec<ExportMovie>,
}

#[derive(Serialize)]
struct ExportData {
    exported_at: String,
    user_id: String,
    standard_lists: ExportStandardLists,
    custom_lists: Vec<ExportCustomList>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/lists/export", get(export_lists))
}

async fn export_lists(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = query.require_user()?;

    let (standard, custom) = tokio::try_join!(
        lists::standard_rows(&state.db, &user_id),
        lists::custom_rows(&state.db, &user_id),
    )?;

    let export = ExportData {
        exported_at: chrono::Utc::now().to_rfc3339(),
        user_id,
        standard_lists: group_standard(standard),
        custom_lists: group_custom(custom),
    };

    let filename = format!("reelbox-export-{}.json", chrono::Local::now().format("%Y-%m-%d"));
    let content_disposition = format!("attachment; filename=\"{}\"", filename);

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(value) = HeaderValue::from_str(&content_disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, Json(export)))
}

fn group_standard(rows: Vec<StandardListRow>) -> ExportStandardLists {
    use crate::models::ListKind;

    let mut lists = ExportStandardLists::default();
    for row in rows {
        let target = match row.list_type {
            ListKind::Watchlist => &mut lists.watchlist,
            ListKind::Watched => &mut lists.watched,
            ListKind::Favourites => &mut lists.favourites,
        };
        target.push(ExportMovie {
            movie: row.movie,
            user_rating: row.user_rating,
            date_added: row.date_added,
        });
    }
    lists
}

/// Fold the flat (list, movie) join back into lists, keeping first-seen order.
/// Rows for empty lists carry no movie and contribute only the list itself.
fn group_custom(rows: Vec<CustomListRow>) -> Vec<ExportCustomList> {
    let mut out: Vec<ExportCustomList> = Vec::new();
    for row in rows {
        let idx = match out.iter().position(|l| l.id == row.list_id) {
            Some(idx) => idx,
            None => {
                out.push(ExportCustomList {
                    id: row.list_id.clone(),
                    name: row.list_name.clone(),
                    movies: Vec::new(),
                });
                out.len() - 1
            }
        };

        let (Some(imdb_id), Some(title)) = (row.imdb_id, row.title) else {
            continue;
        };
        out[idx].movies.push(ExportMovie {
            movie: Movie {
                imdb_id,
                title,
                year: row.year,
                runtime: row.runtime,
                director: row.director,
                actors: row.actors,
                genre: row.genre,
                poster_url: row.poster_url,
            },
            user_rating: None,
            date_added: row.date_added.unwrap_or_default(),
        });
    }
    out
}
