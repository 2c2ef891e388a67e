//! Mock provider for testing purposes.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::{Paper, PaperBuilder, SearchQuery, SourceType};
use crate::sources::{Source, SourceError};

/// A scripted provider that returns predefined papers or a failure.
#[derive(Debug, Default)]
pub struct MockSource {
    id: String,
    source_type: Option<SourceType>,
    papers: Mutex<Vec<Paper>>,
    fail_message: Mutex<Option<String>>,
    last_query: Mutex<Option<SearchQuery>>,
}

impl MockSource {
    /// Create a mock provider with the given id and provenance tag.
    pub fn named(id: &str, source_type: SourceType) -> Self {
        Self {
            id: id.to_string(),
            source_type: Some(source_type),
            ..Default::default()
        }
    }

    /// Script the papers returned by the next searches.
    pub fn set_papers(&self, papers: Vec<Paper>) {
        *self.papers.lock().unwrap() = papers;
        *self.fail_message.lock().unwrap() = None;
    }

    /// Script a total request failure.
    pub fn fail_next(&self, message: &str) {
        *self.fail_message.lock().unwrap() = Some(message.to_string());
    }

    /// The query most recently passed to `search`.
    pub fn last_query(&self) -> Option<SearchQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    fn source_type(&self) -> SourceType {
        self.source_type.unwrap_or(SourceType::Arxiv)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError> {
        *self.last_query.lock().unwrap() = Some(query.clone());
        if let Some(message) = self.fail_message.lock().unwrap().clone() {
            return Err(SourceError::Network(message));
        }
        Ok(self.papers.lock().unwrap().clone())
    }
}

/// Helper to build a minimal paper for tests.
pub fn make_paper(source: SourceType, title: &str, link: &str) -> Paper {
    PaperBuilder::new(source)
        .title(Some(title.to_string()))
        .link(Some(link.to_string()))
        .build()
}
