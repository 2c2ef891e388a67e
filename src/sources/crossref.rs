//! CrossRef provider implementation.
//!
//! Searches the CrossRef works API, then resolves an open-access PDF link
//! per DOI through Unpaywall. The Unpaywall call is strictly best-effort:
//! any failure leaves the record without a PDF URL and never aborts the
//! primary fetch.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::{Paper, PaperBuilder, SearchQuery, SourceType};
use crate::sources::{Source, SourceError};
use crate::utils::{api_retry_config, clean_abstract, with_retry, HttpClient};

/// Default base URL for the CrossRef works API
const CROSSREF_API_URL: &str = "https://api.crossref.org/works";
/// Default base URL for the Unpaywall DOI lookup
const UNPAYWALL_API_URL: &str = "https://api.unpaywall.org/v2";

/// Unpaywall client resolving a DOI to its best open-access PDF URL.
///
/// Unpaywall requires a contact email on every request.
#[derive(Debug, Clone)]
pub struct UnpaywallClient {
    client: Arc<HttpClient>,
    base_url: String,
    email: String,
}

impl UnpaywallClient {
    pub fn new(client: Arc<HttpClient>, email: &str) -> Self {
        Self::with_base_url(client, email, UNPAYWALL_API_URL)
    }

    pub fn with_base_url(client: Arc<HttpClient>, email: &str, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
        }
    }

    /// Look up the best open-access PDF URL for a DOI.
    ///
    /// `Ok(None)` means the lookup worked but the work is not open access
    /// (or has no PDF location); errors are for transport/API failures.
    pub async fn pdf_url(&self, doi: &str) -> Result<Option<String>, SourceError> {
        let url = format!(
            "{}/{}?email={}",
            self.base_url,
            urlencoding::encode(doi),
            urlencoding::encode(&self.email)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Unpaywall lookup failed: {}", e)))?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SourceError::Api {
                status: response.status().as_u16(),
                message: "Unpaywall lookup failed".to_string(),
            });
        }

        let data: UnpaywallResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Unpaywall response: {}", e)))?;

        if !data.is_oa {
            return Ok(None);
        }
        Ok(data.best_oa_location.and_then(|loc| loc.url_for_pdf))
    }
}

/// CrossRef provider
#[derive(Debug, Clone)]
pub struct CrossRefSource {
    client: Arc<HttpClient>,
    base_url: String,
    unpaywall: UnpaywallClient,
}

impl CrossRefSource {
    /// Create a new CrossRef provider against the public endpoint
    pub fn new(client: Arc<HttpClient>, unpaywall: UnpaywallClient) -> Self {
        Self::with_base_url(client, unpaywall, CROSSREF_API_URL)
    }

    /// Create a provider against a custom endpoint
    pub fn with_base_url(
        client: Arc<HttpClient>,
        unpaywall: UnpaywallClient,
        base_url: &str,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            unpaywall,
        }
    }

    fn parse_item(item: CrossRefItem) -> (Paper, Option<String>) {
        // CrossRef titles arrive as an array; the first entry is the
        // canonical one.
        let title = item.title.and_then(|t| t.into_iter().next());

        let authors = item
            .author
            .into_iter()
            .map(|a| {
                format!(
                    "{} {}",
                    a.given.unwrap_or_default(),
                    a.family.unwrap_or_default()
                )
                .trim()
                .to_string()
            })
            .collect::<Vec<_>>();

        let link = item.doi.as_ref().map(|doi| format!("https://doi.org/{}", doi));

        let paper = PaperBuilder::new(SourceType::CrossRef)
            .title(title)
            .authors(authors)
            .abstract_text(item.abstract_text.as_deref().map(clean_abstract))
            .link(link)
            .build();

        (paper, item.doi)
    }
}

#[async_trait]
impl Source for CrossRefSource {
    fn id(&self) -> &str {
        "crossref"
    }

    fn name(&self) -> &str {
        "CrossRef"
    }

    fn source_type(&self) -> SourceType {
        SourceType::CrossRef
    }

    fn default_page_size(&self) -> usize {
        5
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError> {
        let url = format!(
            "{}?query={}&rows={}",
            self.base_url,
            urlencoding::encode(&query.query),
            query.max_results
        );

        let client = Arc::clone(&self.client);
        let url_for_retry = url.clone();

        let data = with_retry(api_retry_config(), || {
            let client = Arc::clone(&client);
            let url = url_for_retry.clone();
            async move {
                let response = client.get(&url).send().await.map_err(|e| {
                    SourceError::Network(format!("failed to search CrossRef: {}", e))
                })?;

                if !response.status().is_success() {
                    return Err(SourceError::Api {
                        status: response.status().as_u16(),
                        message: "CrossRef query failed".to_string(),
                    });
                }

                let json: CrossRefResponse = response
                    .json()
                    .await
                    .map_err(|e| SourceError::Parse(format!("CrossRef response: {}", e)))?;

                Ok(json)
            }
        })
        .await?;

        let mut papers = Vec::with_capacity(data.message.items.len());
        for item in data.message.items {
            let (mut paper, doi) = Self::parse_item(item);

            // One dependent lookup per DOI; degrade to no PDF on any error.
            if let Some(doi) = doi {
                match self.unpaywall.pdf_url(&doi).await {
                    Ok(pdf_url) => paper.pdf_url = pdf_url,
                    Err(err) => {
                        tracing::debug!(%doi, error = %err, "Unpaywall lookup failed");
                    }
                }
            }

            papers.push(paper);
        }

        Ok(papers)
    }
}

// ===== CrossRef / Unpaywall API types =====

#[derive(Debug, Deserialize)]
struct CrossRefResponse {
    message: CrossRefMessage,
}

#[derive(Debug, Deserialize)]
struct CrossRefMessage {
    #[serde(default)]
    items: Vec<CrossRefItem>,
}

#[derive(Debug, Deserialize)]
struct CrossRefItem {
    title: Option<Vec<String>>,
    #[serde(default)]
    author: Vec<CrossRefAuthor>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrossRefAuthor {
    given: Option<String>,
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnpaywallResponse {
    #[serde(default)]
    is_oa: bool,
    best_oa_location: Option<UnpaywallLocation>,
}

#[derive(Debug, Deserialize)]
struct UnpaywallLocation {
    url_for_pdf: Option<String>,
}
