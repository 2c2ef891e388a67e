//! Provider clients with a trait-based plugin architecture.
//!
//! This module defines the [`Source`] trait implemented by each
//! bibliographic provider. A provider turns one [`SearchQuery`] into a
//! normalized list of [`Paper`] records; the [`SourceRegistry`] fans a query
//! out across providers in a fixed order and isolates their failures from
//! one another.

mod arxiv;
mod core;
mod crossref;
pub mod mock;
mod registry;

pub use arxiv::ArxivSource;
pub use core::CoreSource;
pub use crossref::{CrossRefSource, UnpaywallClient};
pub use mock::MockSource;
pub use registry::{FanoutOutcome, SourceRegistry};

use crate::models::{Paper, SearchQuery, SourceType};
use async_trait::async_trait;

/// The Source trait defines the interface for all provider plugins.
///
/// Implementations perform network I/O only; they never mutate shared
/// state. Item-local problems (a malformed entry, a failed per-record
/// enrichment call) must be absorbed into the record, while a failure of
/// the request as a whole surfaces as a [`SourceError`] for the registry
/// to isolate.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this provider (used for credential lookup)
    fn id(&self) -> &str;

    /// Human-readable name of this provider
    fn name(&self) -> &str;

    /// Provenance tag stamped on every record this provider emits
    fn source_type(&self) -> SourceType;

    /// Result-count bound applied when the operator does not pass one
    fn default_page_size(&self) -> usize {
        10
    }

    /// Search for papers matching the query
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError>;
}

/// Errors that can occur when querying a provider
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or transport error
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP response from the provider
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded (XML, JSON, Atom)
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
