//! Core data models for papers and search operations.

mod paper;
mod search;

pub use paper::{Paper, PaperBuilder, SourceType, Translation};
pub use search::SearchQuery;
