//! CORE provider implementation.
//!
//! Uses the CORE v3 works search API. A free API key from
//! https://core.ac.uk/services/api is sent as a bearer token when
//! configured.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::{Paper, PaperBuilder, SearchQuery, SourceType};
use crate::sources::{Source, SourceError};
use crate::utils::{api_retry_config, clean_abstract, with_retry, HttpClient};

/// Default base URL for the CORE works search API
const CORE_API_URL: &str = "https://api.core.ac.uk/v3/search/works";

/// CORE provider
#[derive(Debug, Clone)]
pub struct CoreSource {
    client: Arc<HttpClient>,
    api_key: Option<String>,
    base_url: String,
}

impl CoreSource {
    /// Create a new CORE provider against the public endpoint
    pub fn new(client: Arc<HttpClient>, api_key: Option<String>) -> Self {
        Self::with_base_url(client, api_key, CORE_API_URL)
    }

    /// Create a provider against a custom endpoint
    pub fn with_base_url(
        client: Arc<HttpClient>,
        api_key: Option<String>,
        base_url: &str,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn parse_work(&self, work: CoreWork) -> Paper {
        let authors = work
            .authors
            .into_iter()
            .filter_map(|a| a.name)
            .collect::<Vec<_>>();

        // The landing page is the "display" link; CORE also emits download
        // and thumbnail links under the same array.
        let link = work
            .links
            .into_iter()
            .find(|l| l.link_type.as_deref() == Some("display"))
            .and_then(|l| l.url);

        PaperBuilder::new(SourceType::Core)
            .title(work.title)
            .authors(authors)
            .abstract_text(work.abstract_text.as_deref().map(clean_abstract))
            .link(link)
            .pdf_url(work.download_url)
            .build()
    }
}

#[async_trait]
impl Source for CoreSource {
    fn id(&self) -> &str {
        "core"
    }

    fn name(&self) -> &str {
        "CORE"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Core
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError> {
        let url = format!(
            "{}?q={}&limit={}",
            self.base_url,
            urlencoding::encode(&query.query),
            query.max_results
        );

        let client = Arc::clone(&self.client);
        let url_for_retry = url.clone();
        let api_key = self.api_key.clone();

        let response = with_retry(api_retry_config(), || {
            let client = Arc::clone(&client);
            let url = url_for_retry.clone();
            let api_key = api_key.clone();
            async move {
                let mut request = client.get(&url);
                if let Some(ref key) = api_key {
                    request = request.header("Authorization", format!("Bearer {}", key));
                }

                let response = request
                    .send()
                    .await
                    .map_err(|e| SourceError::Network(format!("failed to search CORE: {}", e)))?;

                if !response.status().is_success() {
                    return Err(SourceError::Api {
                        status: response.status().as_u16(),
                        message: "CORE query failed".to_string(),
                    });
                }

                let json: CoreResponse = response
                    .json()
                    .await
                    .map_err(|e| SourceError::Parse(format!("CORE response: {}", e)))?;

                Ok(json)
            }
        })
        .await?;

        Ok(response
            .results
            .into_iter()
            .map(|work| self.parse_work(work))
            .collect())
    }
}

// ===== CORE API types =====

#[derive(Debug, Deserialize)]
struct CoreResponse {
    #[serde(default)]
    results: Vec<CoreWork>,
}

#[derive(Debug, Deserialize)]
struct CoreWork {
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    authors: Vec<CoreAuthor>,
    #[serde(default)]
    links: Vec<CoreLink>,
    #[serde(rename = "downloadUrl")]
    download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoreAuthor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoreLink {
    #[serde(rename = "type")]
    link_type: Option<String>,
    url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "totalHits": 2,
        "results": [
            {
                "title": "Quantum Widgets",
                "abstract": "Widgets,\nbut quantum.",
                "authors": [{"name": "Grace Hopper"}, {"name": null}],
                "links": [
                    {"type": "download", "url": "https://core.ac.uk/download/1.pdf"},
                    {"type": "display", "url": "https://core.ac.uk/works/1"}
                ],
                "downloadUrl": "https://core.ac.uk/download/1.pdf"
            },
            {
                "title": null,
                "authors": [],
                "links": []
            }
        ]
    }"#;

    fn source(api_key: Option<&str>, base: &str) -> CoreSource {
        CoreSource::with_base_url(
            Arc::new(HttpClient::new()),
            api_key.map(str::to_string),
            base,
        )
    }

    #[test]
    fn test_parse_work() {
        let response: CoreResponse = serde_json::from_str(RESPONSE).unwrap();
        let mut works = response.results.into_iter();
        let src = source(None, CORE_API_URL);

        let full = src.parse_work(works.next().unwrap());
        assert_eq!(full.title.as_deref(), Some("Quantum Widgets"));
        assert_eq!(full.authors, vec!["Grace Hopper"]);
        assert_eq!(full.abstract_text.as_deref(), Some("Widgets, but quantum."));
        assert_eq!(full.link.as_deref(), Some("https://core.ac.uk/works/1"));
        assert_eq!(
            full.pdf_url.as_deref(),
            Some("https://core.ac.uk/download/1.pdf")
        );

        let sparse = src.parse_work(works.next().unwrap());
        assert_eq!(sparse.title, None);
        assert!(sparse.authors.is_empty());
        assert_eq!(sparse.link, None);
        assert_eq!(sparse.pdf_url, None);
    }

    #[tokio::test]
    async fn test_search_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .match_header("authorization", "Bearer secret-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(RESPONSE)
            .create_async()
            .await;

        let src = source(Some("secret-key"), &server.url());
        let papers = src.search(&SearchQuery::new("widgets")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].source, SourceType::Core);
    }

    #[tokio::test]
    async fn test_search_failure_surfaces_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let src = source(None, &server.url());
        let err = src.search(&SearchQuery::new("widgets")).await.unwrap_err();
        assert!(matches!(err, SourceError::Api { status: 401, .. }));
    }
}
