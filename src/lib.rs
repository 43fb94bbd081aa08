pub mod api;
pub mod engine;
pub mod error;
pub mod listing_cache;
pub mod parser;
pub mod render;
pub mod schema;
pub mod score_table;
pub mod search_filter;

pub use error::Error;
