//! Registry fanning one query out across the registered providers.

use std::sync::Arc;

use crate::models::{Paper, SearchQuery, SourceType};

use super::{Source, SourceError};

/// Result of a fan-out search: every record the providers produced, in
/// registration order, plus the providers that failed outright.
#[derive(Debug, Default)]
pub struct FanoutOutcome {
    /// Concatenated provider results, registration order preserved
    pub papers: Vec<Paper>,
    /// Providers whose whole request failed (they contribute no records)
    pub failures: Vec<(SourceType, SourceError)>,
}

/// Ordered collection of provider plugins.
///
/// Registration order matters: it fixes the concatenation order of results,
/// which in turn decides which record survives link-keyed last-write-wins
/// deduplication. The conventional order is arXiv, CORE, CrossRef.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn Source>>,
}

impl SourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Register a provider at the end of the fan-out order
    pub fn register(&mut self, source: Arc<dyn Source>) {
        self.sources.push(source);
    }

    /// All registered providers, in fan-out order
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Source>> {
        self.sources.iter()
    }

    /// Get the number of registered providers
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Query every provider in order with the given terms.
    ///
    /// The per-provider result bound is `limit` when given, otherwise each
    /// provider's own default page size. A provider failure is recorded and
    /// isolated: the remaining providers still run.
    pub async fn search_all(&self, terms: &str, limit: Option<usize>) -> FanoutOutcome {
        let mut outcome = FanoutOutcome::default();

        for source in &self.sources {
            let query = SearchQuery::new(terms)
                .max_results(limit.unwrap_or_else(|| source.default_page_size()));

            match source.search(&query).await {
                Ok(mut papers) => {
                    tracing::info!(
                        provider = source.name(),
                        count = papers.len(),
                        "provider search complete"
                    );
                    outcome.papers.append(&mut papers);
                }
                Err(err) => {
                    tracing::warn!(provider = source.name(), error = %err, "provider search failed");
                    outcome.failures.push((source.source_type(), err));
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::{make_paper, MockSource};

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(MockSource::named("a", SourceType::Arxiv)));
        registry.register(Arc::new(MockSource::named("b", SourceType::Core)));

        let ids: Vec<&str> = registry.all().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_search_all_concatenates_in_order() {
        let first = MockSource::named("first", SourceType::Arxiv);
        first.set_papers(vec![make_paper(SourceType::Arxiv, "A", "https://a/1")]);
        let second = MockSource::named("second", SourceType::Core);
        second.set_papers(vec![make_paper(SourceType::Core, "B", "https://b/1")]);

        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(first));
        registry.register(Arc::new(second));

        let outcome = registry.search_all("anything", None).await;
        assert!(outcome.failures.is_empty());
        let titles: Vec<_> = outcome
            .papers
            .iter()
            .map(|p| p.title.clone().unwrap())
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_rest() {
        let failing = MockSource::named("down", SourceType::Arxiv);
        failing.fail_next("connection refused");
        let healthy = MockSource::named("up", SourceType::CrossRef);
        healthy.set_papers(vec![make_paper(SourceType::CrossRef, "C", "https://c/1")]);

        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(failing));
        registry.register(Arc::new(healthy));

        let outcome = registry.search_all("anything", None).await;
        assert_eq!(outcome.papers.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, SourceType::Arxiv);
    }

    #[tokio::test]
    async fn test_limit_overrides_default_page_size() {
        let source = Arc::new(MockSource::named("probe", SourceType::Core));
        source.set_papers(Vec::new());

        let mut registry = SourceRegistry::new();
        registry.register(Arc::clone(&source) as Arc<dyn crate::sources::Source>);

        registry.search_all("q", Some(3)).await;
        assert_eq!(source.last_query().unwrap().max_results, 3);

        registry.search_all("q", None).await;
        assert_eq!(source.last_query().unwrap().max_results, 10);
    }
}
