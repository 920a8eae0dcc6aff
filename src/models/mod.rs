pub mod list;
pub mod movie;

pub use list::{CustomList, CustomListRow, ListKind, StandardListRow};
pub use movie::{is_valid_imdb_id, Movie, MovieRef};
