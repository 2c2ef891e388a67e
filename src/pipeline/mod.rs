//! End-to-end discovery pipeline.
//!
//! Free text is turned into keywords, the keywords are translated into the
//! provider query language and joined, the query fans out across the
//! registered providers, the merged results are deduplicated by link, and
//! each surviving record is enriched and offered to the operator for
//! download. The whole run is single-threaded and strictly sequential.

pub mod retrieval;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::keywords::{KeywordClient, KeywordError};
use crate::models::{Paper, Translation};
use crate::sources::SourceRegistry;
use crate::translate::Translator;
use crate::ui;
use crate::utils::{dedupe_by_link, HttpClient};

use retrieval::{process_record, Prompter, RecordOutcome};

/// Errors that terminate a whole run.
///
/// Everything scoped to a single provider or a single record is degraded
/// and reported inside the run instead of surfacing here.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("keyword extraction failed: {0}")]
    Keywords(#[from] KeywordError),

    #[error("the model produced no keywords, so no search query can be formed")]
    NoKeywords,

    #[error("cannot prepare storage directory {path}: {source}")]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("console error: {0}")]
    Io(#[from] std::io::Error),
}

/// Counters reported after a run completes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Final provider query string
    pub query: String,
    /// Records fetched across all providers, before deduplication
    pub fetched: usize,
    /// Unique records after deduplication
    pub unique: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// The discovery pipeline with all collaborators injected up front.
pub struct Pipeline {
    registry: SourceRegistry,
    keywords: KeywordClient,
    translator: Option<Arc<dyn Translator>>,
    prompter: Box<dyn Prompter>,
    http: Arc<HttpClient>,
    settings: Settings,
}

impl Pipeline {
    pub fn new(
        registry: SourceRegistry,
        keywords: KeywordClient,
        translator: Option<Arc<dyn Translator>>,
        prompter: Box<dyn Prompter>,
        http: Arc<HttpClient>,
        settings: Settings,
    ) -> Self {
        Self {
            registry,
            keywords,
            translator,
            prompter,
            http,
            settings,
        }
    }

    /// Run the pipeline for one research interest.
    pub async fn run(&mut self, interest: &str) -> Result<RunSummary, PipelineError> {
        let papers_dir = self.settings.papers_dir();
        std::fs::create_dir_all(&papers_dir).map_err(|source| PipelineError::Storage {
            path: papers_dir.clone(),
            source,
        })?;

        let keywords = self.keywords.extract_keywords(interest).await?;
        if keywords.is_empty() {
            return Err(PipelineError::NoKeywords);
        }
        ui::info(format!("Keywords: {}", keywords.join(", ")));

        let query = self.translate_keywords(&keywords).await.join(" ");
        ui::info(format!("Search query: {}", query));

        let outcome = self
            .registry
            .search_all(&query, self.settings.limit)
            .await;
        for (source, err) in &outcome.failures {
            ui::warn(format!("{} search failed: {}", source, err));
        }

        let fetched = outcome.papers.len();
        let mut papers = dedupe_by_link(outcome.papers);
        ui::info(format!(
            "{} results across providers, {} unique",
            fetched,
            papers.len()
        ));

        let mut summary = RunSummary {
            query,
            fetched,
            unique: papers.len(),
            ..Default::default()
        };

        for paper in &mut papers {
            // Enrichment runs after dedup so duplicates never cost a
            // translation call.
            self.enrich(paper).await;
            ui::print_paper(paper, &self.settings.operator_lang);

            match process_record(paper, self.prompter.as_mut(), &self.http, &papers_dir).await? {
                RecordOutcome::Downloaded(_) => summary.downloaded += 1,
                RecordOutcome::Skipped => summary.skipped += 1,
                RecordOutcome::DownloadFailed { .. } => summary.failed += 1,
            }
        }

        Ok(summary)
    }

    /// Translate each keyword into the provider query language, falling
    /// back to the untranslated keyword on any per-item failure.
    async fn translate_keywords(&self, keywords: &[String]) -> Vec<String> {
        let Some(translator) = &self.translator else {
            return keywords.to_vec();
        };

        let mut translated = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            match translator
                .translate(
                    keyword,
                    &self.settings.operator_lang,
                    &self.settings.search_lang,
                )
                .await
            {
                Ok(text) => translated.push(text),
                Err(err) => {
                    ui::warn(format!(
                        "Could not translate keyword \"{}\": {}",
                        keyword, err
                    ));
                    translated.push(keyword.clone());
                }
            }
        }
        translated
    }

    /// Attach a translated abstract to one record; failures leave an
    /// explicit marker and never abort the loop.
    async fn enrich(&self, paper: &mut Paper) {
        let Some(abstract_text) = paper.abstract_text.as_deref() else {
            return;
        };
        let Some(translator) = &self.translator else {
            paper.translated_abstract = Translation::Failed;
            return;
        };

        match translator
            .translate(
                abstract_text,
                &self.settings.search_lang,
                &self.settings.operator_lang,
            )
            .await
        {
            Ok(text) => paper.translated_abstract = Translation::Translated(text),
            Err(err) => {
                tracing::warn!(error = %err, "abstract translation failed");
                paper.translated_abstract = Translation::Failed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaperBuilder, SourceType};
    use crate::translate::TranslateError;
    use async_trait::async_trait;

    /// Translator double: uppercases, or fails on texts containing "FAIL".
    #[derive(Debug)]
    struct FakeTranslator;

    #[async_trait]
    impl Translator for FakeTranslator {
        async fn translate(
            &self,
            text: &str,
            _from_lang: &str,
            _to_lang: &str,
        ) -> Result<String, TranslateError> {
            if text.contains("FAIL") {
                Err(TranslateError::Api("scripted failure".to_string()))
            } else {
                Ok(text.to_uppercase())
            }
        }
    }

    fn pipeline_with_translator(translator: Option<Arc<dyn Translator>>) -> Pipeline {
        let credentials = crate::config::Credentials {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        let http = Arc::new(HttpClient::new());
        Pipeline::new(
            SourceRegistry::new(),
            KeywordClient::from_credentials(Arc::clone(&http), &credentials).unwrap(),
            translator,
            Box::new(retrieval::ScriptedPrompter::new(&[])),
            http,
            Settings::new(std::env::temp_dir()),
        )
    }

    #[tokio::test]
    async fn test_keyword_translation_falls_back_on_failure() {
        let pipeline = pipeline_with_translator(Some(Arc::new(FakeTranslator)));
        let out = pipeline
            .translate_keywords(&["ok".to_string(), "FAIL word".to_string()])
            .await;
        assert_eq!(out, vec!["OK", "FAIL word"]);
    }

    #[tokio::test]
    async fn test_keywords_untouched_without_translator() {
        let pipeline = pipeline_with_translator(None);
        let out = pipeline.translate_keywords(&["词".to_string()]).await;
        assert_eq!(out, vec!["词"]);
    }

    #[tokio::test]
    async fn test_enrich_marks_success_and_failure() {
        let pipeline = pipeline_with_translator(Some(Arc::new(FakeTranslator)));

        let mut ok = PaperBuilder::new(SourceType::Core)
            .abstract_text(Some("fine text".to_string()))
            .build();
        pipeline.enrich(&mut ok).await;
        assert_eq!(
            ok.translated_abstract,
            Translation::Translated("FINE TEXT".to_string())
        );

        let mut bad = PaperBuilder::new(SourceType::Core)
            .abstract_text(Some("FAIL text".to_string()))
            .build();
        pipeline.enrich(&mut bad).await;
        assert_eq!(bad.translated_abstract, Translation::Failed);
    }

    #[tokio::test]
    async fn test_enrich_skips_missing_abstract() {
        let pipeline = pipeline_with_translator(Some(Arc::new(FakeTranslator)));
        let mut paper = PaperBuilder::new(SourceType::Core).build();
        pipeline.enrich(&mut paper).await;
        assert_eq!(paper.translated_abstract, Translation::NotTranslated);
    }

    #[tokio::test]
    async fn test_enrich_without_translator_is_marked_failed() {
        let pipeline = pipeline_with_translator(None);
        let mut paper = PaperBuilder::new(SourceType::Core)
            .abstract_text(Some("text".to_string()))
            .build();
        pipeline.enrich(&mut paper).await;
        assert_eq!(paper.translated_abstract, Translation::Failed);
    }
}
