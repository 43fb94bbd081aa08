pub mod listing;
pub mod stats;
