use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paper_harvest::config::{CredentialStore, FileCredentialStore, Settings};
use paper_harvest::keywords::KeywordClient;
use paper_harvest::pipeline::retrieval::{Prompter, StdinPrompter};
use paper_harvest::pipeline::Pipeline;
use paper_harvest::sources::{
    ArxivSource, CoreSource, CrossRefSource, SourceRegistry, UnpaywallClient,
};
use paper_harvest::translate::{BaiduTranslator, Translator};
use paper_harvest::ui;
use paper_harvest::utils::HttpClient;

/// paper-harvest - discover and download academic papers from arXiv, CORE and CrossRef
#[derive(Parser, Debug)]
#[command(name = "paper-harvest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Discover and download academic papers from arXiv, CORE and CrossRef", long_about = None)]
struct Cli {
    /// Research interest in free text; prompted for interactively when omitted
    interest: Option<String>,

    /// Directory papers are stored under (a papers/ subfolder is created)
    #[arg(long, short = 'd')]
    storage_dir: Option<PathBuf>,

    /// Credential file path (defaults to the platform config directory)
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Per-provider result bound (each provider keeps its own default when unset)
    #[arg(long, short = 'n')]
    limit: Option<usize>,

    /// Language the operator reads; abstracts are translated into it
    #[arg(long, default_value = paper_harvest::config::DEFAULT_OPERATOR_LANG)]
    operator_lang: String,

    /// Language providers are queried in; keywords are translated into it
    #[arg(long, default_value = paper_harvest::config::DEFAULT_SEARCH_LANG)]
    search_lang: String,

    /// Contact email sent to Unpaywall
    #[arg(long)]
    email: Option<String>,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error log output
    #[arg(long, short)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("paper_harvest={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = FileCredentialStore::load_or_default(cli.credentials.as_deref())
        .context("failed to load credential file")?;

    // Without a storage directory there is nowhere to put accepted
    // downloads, so the run cannot proceed.
    let Some(storage_root) = cli.storage_dir else {
        bail!("no storage directory configured; pass --storage-dir");
    };

    let mut settings = Settings::new(storage_root);
    settings.limit = cli.limit;
    settings.operator_lang = cli.operator_lang;
    settings.search_lang = cli.search_lang;
    if let Some(email) = cli.email {
        settings.contact_email = email;
    }

    let http = Arc::new(HttpClient::new());

    let keywords = KeywordClient::from_credentials(Arc::clone(&http), &store.get("chatglm"))
        .context("keyword model is not configured; add a [chatglm] api_key to the credential file")?;

    let translator: Option<Arc<dyn Translator>> =
        match BaiduTranslator::from_credentials(Arc::clone(&http), &store.get("baidu-translate")) {
            Ok(t) => Some(Arc::new(t)),
            Err(err) => {
                ui::warn(format!(
                    "Translation disabled ({}); keywords and abstracts stay untranslated.",
                    err
                ));
                None
            }
        };

    let registry = build_registry(&http, &store, &settings);

    let mut prompter: Box<dyn Prompter> = Box::new(StdinPrompter);
    let interest = match cli.interest {
        Some(text) => text,
        None => {
            let line = prompter.read_line("What would you like to research? ")?;
            line.trim().to_string()
        }
    };
    if interest.is_empty() {
        bail!("no research interest given");
    }

    let mut pipeline = Pipeline::new(registry, keywords, translator, prompter, http, settings);
    let summary = pipeline.run(&interest).await?;

    println!();
    ui::success(format!(
        "Done: {} unique papers, {} downloaded, {} skipped, {} failed.",
        summary.unique, summary.downloaded, summary.skipped, summary.failed
    ));
    Ok(())
}

/// Register the three providers in the fixed fan-out order: arXiv, CORE,
/// CrossRef. The order decides which record survives deduplication.
fn build_registry(
    http: &Arc<HttpClient>,
    store: &dyn CredentialStore,
    settings: &Settings,
) -> SourceRegistry {
    let mut registry = SourceRegistry::new();

    let arxiv = store.get("arxiv");
    registry.register(Arc::new(match arxiv.base_url.as_deref() {
        Some(base) => ArxivSource::with_base_url(Arc::clone(http), base),
        None => ArxivSource::new(Arc::clone(http)),
    }));

    let core = store.get("core");
    registry.register(Arc::new(match core.base_url.as_deref() {
        Some(base) => CoreSource::with_base_url(Arc::clone(http), core.api_key.clone(), base),
        None => CoreSource::new(Arc::clone(http), core.api_key.clone()),
    }));

    let unpaywall_email = store
        .get("unpaywall")
        .api_key
        .unwrap_or_else(|| settings.contact_email.clone());
    let unpaywall = UnpaywallClient::new(Arc::clone(http), &unpaywall_email);
    let crossref = store.get("crossref");
    registry.register(Arc::new(match crossref.base_url.as_deref() {
        Some(base) => CrossRefSource::with_base_url(Arc::clone(http), unpaywall, base),
        None => CrossRefSource::new(Arc::clone(http), unpaywall),
    }));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["paper-harvest"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert_eq!(cli.operator_lang, "zh");
        assert_eq!(cli.search_lang, "en");
        assert_eq!(cli.limit, None);
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["paper-harvest", "-v"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["paper-harvest", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_registry_order_is_arxiv_core_crossref() {
        let http = Arc::new(HttpClient::new());
        let store = FileCredentialStore::default();
        let settings = Settings::new(PathBuf::from("/tmp"));
        let registry = build_registry(&http, &store, &settings);

        let ids: Vec<&str> = registry.all().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["arxiv", "core", "crossref"]);
    }
}
