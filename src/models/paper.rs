//! Paper model representing a discovered paper from any provider.

use serde::{Deserialize, Serialize};

/// The provider where the paper was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Arxiv,
    Core,
    CrossRef,
}

impl SourceType {
    /// Returns the display name of the provider
    pub fn name(&self) -> &'static str {
        match self {
            SourceType::Arxiv => "arXiv",
            SourceType::Core => "CORE",
            SourceType::CrossRef => "CrossRef",
        }
    }

    /// Returns the provider identifier (used for credential lookup)
    pub fn id(&self) -> &'static str {
        match self {
            SourceType::Arxiv => "arxiv",
            SourceType::Core => "core",
            SourceType::CrossRef => "crossref",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Enrichment state of a paper's abstract.
///
/// `Failed` is an explicit marker: the translation collaborator was asked and
/// did not deliver, which is distinct from never having been asked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Translation {
    #[default]
    NotTranslated,
    Translated(String),
    Failed,
}

/// A paper discovered by one of the providers, normalized to a single shape.
///
/// Absent metadata is represented as `None` / an empty author list rather
/// than placeholder strings, so callers can tell "unknown" apart from text
/// that legitimately equals a placeholder. The display layer substitutes
/// placeholders at the last moment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    /// Paper title
    pub title: Option<String>,

    /// Author display names, in provider order
    pub authors: Vec<String>,

    /// Abstract text, markup stripped and whitespace normalized
    pub abstract_text: Option<String>,

    /// Canonical landing page; identity key for deduplication
    pub link: Option<String>,

    /// Direct full-text PDF URL
    pub pdf_url: Option<String>,

    /// Provider the paper came from
    pub source: SourceType,

    /// Translated counterpart of the abstract, filled in by enrichment
    #[serde(default)]
    pub translated_abstract: Translation,
}

impl Paper {
    /// Create an empty paper for the given provider
    pub fn new(source: SourceType) -> Self {
        Self {
            title: None,
            authors: Vec::new(),
            abstract_text: None,
            link: None,
            pdf_url: None,
            source,
            translated_abstract: Translation::NotTranslated,
        }
    }

    /// Whether a full-text PDF can be fetched for this paper
    pub fn has_pdf(&self) -> bool {
        self.pdf_url.is_some()
    }
}

/// Builder for constructing Paper records inside provider clients
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    paper: Paper,
}

impl PaperBuilder {
    pub fn new(source: SourceType) -> Self {
        Self {
            paper: Paper::new(source),
        }
    }

    /// Set the title; `None` and blank strings are both recorded as absent
    pub fn title(mut self, title: impl Into<Option<String>>) -> Self {
        self.paper.title = title.into().filter(|t| !t.trim().is_empty());
        self
    }

    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.paper.authors = authors
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        self
    }

    pub fn abstract_text(mut self, text: impl Into<Option<String>>) -> Self {
        self.paper.abstract_text = text.into().filter(|t| !t.trim().is_empty());
        self
    }

    pub fn link(mut self, link: impl Into<Option<String>>) -> Self {
        self.paper.link = link.into().filter(|l| !l.trim().is_empty());
        self
    }

    pub fn pdf_url(mut self, url: impl Into<Option<String>>) -> Self {
        self.paper.pdf_url = url.into().filter(|u| !u.trim().is_empty());
        self
    }

    pub fn build(self) -> Paper {
        self.paper
    }
}
