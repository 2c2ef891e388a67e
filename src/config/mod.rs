//! Configuration and credential management.
//!
//! Credentials are looked up by provider name through the
//! [`CredentialStore`] trait and handed to the pipeline at construction
//! time, so tests can substitute a double without touching global state.
//!
//! # Credential File Format
//!
//! ```toml
//! [chatglm]
//! api_key = "your-chatglm-key"
//!
//! [baidu-translate]
//! app_id = "20240000000000000"
//! secret_key = "your-secret"
//!
//! [core]
//! api_key = "your-core-key"
//!
//! [arxiv]
//! base_url = "https://export.arxiv.org/api/query"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Contact email sent to Unpaywall when none is configured
pub const DEFAULT_CONTACT_EMAIL: &str = "paper-harvest@users.noreply.github.com";

/// Default operator language (abstracts are translated into this)
pub const DEFAULT_OPERATOR_LANG: &str = "zh";
/// Default provider query language (keywords are translated into this)
pub const DEFAULT_SEARCH_LANG: &str = "en";

/// Name-keyed credential bundle for one external service.
///
/// Every field is optional; a missing `base_url` means "use the provider's
/// documented default endpoint".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub app_id: Option<String>,

    #[serde(default)]
    pub secret_key: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,
}

impl Credentials {
    /// Whether no field is configured at all
    pub fn is_empty(&self) -> bool {
        self.api_key.is_none()
            && self.app_id.is_none()
            && self.secret_key.is_none()
            && self.base_url.is_none()
    }
}

/// Lookup of credentials by service name.
///
/// Unconfigured services yield an empty record, never an error.
pub trait CredentialStore: Send + Sync {
    fn get(&self, name: &str) -> Credentials;
}

/// Credential store backed by a TOML file.
#[derive(Debug, Clone, Default)]
pub struct FileCredentialStore {
    entries: HashMap<String, Credentials>,
}

impl FileCredentialStore {
    /// Default credential file location under the platform config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("paper-harvest").join("credentials.toml"))
    }

    /// Load a credential file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries: HashMap<String, Credentials> = toml::from_str(&raw)?;
        tracing::debug!(path = %path.display(), services = entries.len(), "loaded credentials");
        Ok(Self { entries })
    }

    /// Load the file at `path` if given, otherwise the default location.
    /// A missing file yields an empty store; a malformed one is an error.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path(),
        };
        match resolved {
            Some(p) if p.exists() => Self::load(&p),
            _ => Ok(Self::default()),
        }
    }

    /// Insert or replace a credential record (used by tests and setup code)
    pub fn insert(&mut self, name: &str, credentials: Credentials) {
        self.entries.insert(name.to_string(), credentials);
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, name: &str) -> Credentials {
        self.entries.get(name).cloned().unwrap_or_default()
    }
}

/// Run-wide settings resolved from CLI flags and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory the `papers/` download folder is created in
    pub storage_root: PathBuf,

    /// Per-provider result bound; `None` keeps each provider's default
    pub limit: Option<usize>,

    /// Language the operator reads (translation target for abstracts,
    /// translation source for keywords)
    pub operator_lang: String,

    /// Language the providers are queried in
    pub search_lang: String,

    /// Contact email for the Unpaywall API
    pub contact_email: String,
}

impl Settings {
    pub fn new(storage_root: PathBuf) -> Self {
        Self {
            storage_root,
            limit: None,
            operator_lang: DEFAULT_OPERATOR_LANG.to_string(),
            search_lang: DEFAULT_SEARCH_LANG.to_string(),
            contact_email: DEFAULT_CONTACT_EMAIL.to_string(),
        }
    }

    /// The directory accepted downloads are written to
    pub fn papers_dir(&self) -> PathBuf {
        self.storage_root.join("papers")
    }
}
