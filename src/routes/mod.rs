pub mod export;
pub mod lists;
