//! arXiv provider implementation.

use async_trait::async_trait;
use feed_rs::parser;
use std::sync::Arc;

use crate::models::{Paper, PaperBuilder, SearchQuery, SourceType};
use crate::sources::{Source, SourceError};
use crate::utils::{api_retry_config, clean_abstract, with_retry, HttpClient};

/// Default base URL for the arXiv query API
const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";
/// Base URL for arXiv PDFs
const ARXIV_PDF_URL: &str = "https://arxiv.org/pdf";

/// arXiv provider
///
/// Queries the arXiv Atom API and maps each feed entry into a normalized
/// [`Paper`]. The PDF URL is derived from the entry's abstract-page id.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl ArxivSource {
    /// Create a new arXiv provider against the public endpoint
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self::with_base_url(client, ARXIV_API_URL)
    }

    /// Create a provider against a custom endpoint (credential `base_url`
    /// override, mock servers in tests)
    pub fn with_base_url(client: Arc<HttpClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Extract the bare paper id from an abs URL like
    /// `http://arxiv.org/abs/2301.12345v1`.
    fn paper_id(entry_id: &str) -> Option<&str> {
        let after = entry_id.split("/abs/").nth(1)?;
        let id = after.split('/').next().unwrap_or(after);
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    /// Map an Atom entry into a Paper
    fn parse_entry(&self, entry: &feed_rs::model::Entry) -> Paper {
        let title = entry.title.as_ref().map(|t| t.content.clone());

        let authors: Vec<String> = entry.authors.iter().map(|a| a.name.clone()).collect();

        let abstract_text = entry
            .summary
            .as_ref()
            .map(|s| clean_abstract(&s.content));

        // The alternate link is the abstract landing page; fall back to the
        // entry id, which carries the same URL on arXiv.
        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref() == Some("alternate"))
            .or_else(|| entry.links.first())
            .map(|l| l.href.clone())
            .or_else(|| {
                if entry.id.starts_with("http") {
                    Some(entry.id.clone())
                } else {
                    None
                }
            });

        let pdf_url = Self::paper_id(&entry.id)
            .map(|id| format!("{}/{}.pdf", ARXIV_PDF_URL, id.trim_end_matches(".pdf")));

        PaperBuilder::new(SourceType::Arxiv)
            .title(title)
            .authors(authors)
            .abstract_text(abstract_text)
            .link(link)
            .pdf_url(pdf_url)
            .build()
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn id(&self) -> &str {
        "arxiv"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Arxiv
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError> {
        let url = format!(
            "{}?search_query={}&start={}&max_results={}",
            self.base_url,
            urlencoding::encode(&query.query),
            query.start,
            query.max_results
        );

        let client = Arc::clone(&self.client);
        let url_for_retry = url.clone();

        let feed = with_retry(api_retry_config(), || {
            let client = Arc::clone(&client);
            let url = url_for_retry.clone();
            async move {
                let response = client
                    .get(&url)
                    .header("Accept", "application/atom+xml")
                    .send()
                    .await
                    .map_err(|e| {
                        SourceError::Network(format!("failed to fetch arXiv results: {}", e))
                    })?;

                if !response.status().is_success() {
                    return Err(SourceError::Api {
                        status: response.status().as_u16(),
                        message: "arXiv query failed".to_string(),
                    });
                }

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| SourceError::Network(format!("failed to read response: {}", e)))?;

                parser::parse(bytes.as_ref())
                    .map_err(|e| SourceError::Parse(format!("Atom feed: {}", e)))
            }
        })
        .await?;

        Ok(feed
            .entries
            .iter()
            .map(|entry| self.parse_entry(entry))
            .collect())
    }
}
