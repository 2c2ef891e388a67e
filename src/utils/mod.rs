//! Utility modules supporting the discovery pipeline.
//!
//! - [`dedupe_by_link`]: collapse cross-provider results to one record per link
//! - [`HttpClient`]: shared HTTP client with timeouts and a crate user agent
//! - [`with_retry`] / [`RetryConfig`]: bounded retry for idempotent API reads
//! - [`clean_abstract`] / [`sanitize_filename`]: text normalization
//! - [`download_pdf`]: fetch a PDF into the storage directory

mod dedup;
mod download;
mod http;
mod retry;
mod text;

pub use dedup::dedupe_by_link;
pub use download::{download_pdf, target_path, DownloadError};
pub use http::HttpClient;
pub use retry::{api_retry_config, with_retry, RetryConfig};
pub use text::{clean_abstract, sanitize_filename};
