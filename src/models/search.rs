//! Search query model shared by all provider clients.

use serde::{Deserialize, Serialize};

/// One bounded page of results requested from a provider.
///
/// Providers cap `max_results` against their own documented limits; `start`
/// is only honored by providers that paginate (arXiv).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Space-separated search terms
    pub query: String,

    /// Maximum number of results to return
    pub max_results: usize,

    /// Offset of the first result (arXiv `start` parameter)
    pub start: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            max_results: 10,
            start: 0,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set maximum results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Set the start offset
    pub fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = SearchQuery::new("machine learning").max_results(25).start(10);
        assert_eq!(query.query, "machine learning");
        assert_eq!(query.max_results, 25);
        assert_eq!(query.start, 10);
    }

    #[test]
    fn test_query_defaults() {
        let query = SearchQuery::new("optics");
        assert_eq!(query.max_results, 10);
        assert_eq!(query.start, 0);
    }
}
