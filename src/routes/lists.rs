use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::AdminCredential;
use crate::error::AppError;
use crate::lists;
use crate::models::{is_valid_imdb_id, CustomList, CustomListRow, ListKind, MovieRef, StandardListRow};
use crate::AppState;

#[derive(Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

impl UserQuery {
    pub fn require_user(self) -> Result<String, AppError> {
        match self.user_id {
            Some(id) if !id.trim().is_empty() => Ok(id),
            _ => Err(AppError::Validation("User ID is required.".to_string())),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListsResponse {
    pub standard_lists: Vec<StandardListRow>,
    pub custom_lists: Vec<CustomListRow>,
}

/// Write requests, tagged by `action`. Each variant carries only the fields
/// that action needs.
#[derive(Debug, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Mutation {
    ToggleStandardList {
        user_id: String,
        list_type: ListKind,
        movie: MovieRef,
    },
    CreateList {
        user_id: String,
        name: String,
    },
    DeleteList {
        user_id: String,
        list_id: String,
    },
    AddToCustomList {
        user_id: String,
        list_id: String,
        movie: MovieRef,
    },
    RemoveFromCustomList {
        user_id: String,
        list_id: String,
        movie: MovieRef,
    },
    RateMovie {
        user_id: String,
        list_type: ListKind,
        movie: MovieRef,
        #[serde(default)]
        rating: Option<u8>,
    },
}

impl Mutation {
    pub fn decode(body: &[u8]) -> Result<Self, AppError> {
        let mutation: Mutation = serde_json::from_slice(body)
            .map_err(|e| AppError::Validation(format!("Invalid request: {e}")))?;
        mutation.validate()?;
        Ok(mutation)
    }

    fn validate(&self) -> Result<(), AppError> {
        let (user_id, movie) = match self {
            Mutation::ToggleStandardList { user_id, movie, .. }
            | Mutation::AddToCustomList { user_id, movie, .. }
            | Mutation::RemoveFromCustomList { user_id, movie, .. } => (user_id, Some(movie)),
            Mutation::RateMovie { user_id, movie, rating, .. } => {
                if rating.is_some_and(|r| !(1..=10).contains(&r)) {
                    return Err(AppError::Validation("Rating must be between 1 and 10".to_string()));
                }
                (user_id, Some(movie))
            }
            Mutation::CreateList { user_id, name } => {
                if name.trim().is_empty() {
                    return Err(AppError::Validation("Name is required".to_string()));
                }
                if name.len() > 100 {
                    return Err(AppError::Validation("Name must be under 100 characters".to_string()));
                }
                (user_id, None)
            }
            Mutation::DeleteList { user_id, .. } => (user_id, None),
        };

        if user_id.trim().is_empty() {
            return Err(AppError::Validation("User ID is required.".to_string()));
        }
        if let Some(movie) = movie {
            if !is_valid_imdb_id(&movie.imdb_id) {
                return Err(AppError::Validation(format!("Invalid movie id '{}'", movie.imdb_id)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl MutationResponse {
    fn ok() -> Self {
        Self { success: true, id: None }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/lists", get(get_lists).post(mutate))
}

async fn get_lists(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ListsResponse>, AppError> {
    let user_id = query.require_user()?;

    let (standard_lists, custom_lists) = tokio::try_join!(
        lists::standard_rows(&state.db, &user_id),
        lists::custom_rows(&state.db, &user_id),
    )?;

    Ok(Json(ListsResponse {
        standard_lists,
        custom_lists,
    }))
}

async fn mutate(
    _credential: AdminCredential,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MutationResponse>, AppError> {
    let mutation = Mutation::decode(&body)?;
    apply(&state, mutation).await.map(Json)
}

async fn apply(state: &AppState, mutation: Mutation) -> Result<MutationResponse, AppError> {
    let db = &state.db;

    match mutation {
        Mutation::ToggleStandardList {
            user_id,
            list_type,
            movie,
        } => {
            let movie = state.catalog.ensure_movie(db, &movie).await?;
            lists::toggle_standard(db, &user_id, &movie.imdb_id, list_type).await?;
            Ok(MutationResponse::ok())
        }
        Mutation::CreateList { user_id, name } => {
            let list = CustomList::new(user_id, name);
            lists::create_list(db, &list).await?;
            Ok(MutationResponse {
                success: true,
                id: Some(list.id),
            })
        }
        Mutation::DeleteList { user_id, list_id } => {
            // Unknown or foreign lists are left alone
            if !lists::delete_list(db, &user_id, &list_id).await? {
                tracing::debug!("DELETE_LIST for {list_id} matched nothing for user {user_id}");
            }
            Ok(MutationResponse::ok())
        }
        Mutation::AddToCustomList {
            user_id,
            list_id,
            movie,
        } => {
            require_list(state, &user_id, &list_id).await?;
            let movie = state.catalog.ensure_movie(db, &movie).await?;
            lists::add_to_list(db, &list_id, &movie.imdb_id).await?;
            Ok(MutationResponse::ok())
        }
        Mutation::RemoveFromCustomList {
            user_id,
            list_id,
            movie,
        } => {
            require_list(state, &user_id, &list_id).await?;
            lists::remove_from_list(db, &list_id, &movie.imdb_id).await?;
            Ok(MutationResponse::ok())
        }
        Mutation::RateMovie {
            user_id,
            list_type,
            movie,
            rating,
        } => {
            if !lists::set_rating(db, &user_id, &movie.imdb_id, list_type, rating).await? {
                return Err(AppError::NotFound(format!(
                    "{} is not in {list_type}",
                    movie.imdb_id
                )));
            }
            Ok(MutationResponse::ok())
        }
    }
}

async fn require_list(state: &AppState, user_id: &str, list_id: &str) -> Result<CustomList, AppError> {
    lists::find_list(&state.db, user_id, list_id)
        .await?
        .ok_or_else(|| AppError::NotFound("List not found".to_string()))
}
