//! PDF download to the storage directory.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::utils::{sanitize_filename, HttpClient};

/// Stem used when a paper has no title to sanitize
const UNTITLED_STEM: &str = "untitled";

/// Errors that can occur while fetching a PDF
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server returned status {0}")]
    Http(u16),

    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),
}

/// Compute the target path for a paper title inside `dir`.
pub fn target_path(dir: &Path, title: Option<&str>) -> PathBuf {
    let stem = match title {
        Some(t) => {
            let s = sanitize_filename(t);
            if s.is_empty() {
                UNTITLED_STEM.to_string()
            } else {
                s
            }
        }
        None => UNTITLED_STEM.to_string(),
    };
    dir.join(format!("{}.pdf", stem))
}

/// Fetch `url` and write the body to `<dir>/<sanitized-title>.pdf`.
///
/// Single attempt: a failing download is reported to the operator rather
/// than retried.
pub async fn download_pdf(
    client: &HttpClient,
    url: &str,
    dir: &Path,
    title: Option<&str>,
) -> Result<PathBuf, DownloadError> {
    let path = target_path(dir, title);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DownloadError::Network(e.to_string()))?;

    if !response.status().is_success() {
        return Err(DownloadError::Http(response.status().as_u16()));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| DownloadError::Network(e.to_string()))?;

    std::fs::write(&path, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "saved PDF");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_path_sanitizes_title() {
        let path = target_path(Path::new("/tmp/papers"), Some("A/B: Test?"));
        assert_eq!(path, PathBuf::from("/tmp/papers/A_B_Test_.pdf"));
    }

    #[test]
    fn test_target_path_untitled_fallback() {
        let path = target_path(Path::new("/tmp/papers"), None);
        assert_eq!(path, PathBuf::from("/tmp/papers/untitled.pdf"));

        let blank = target_path(Path::new("/tmp/papers"), Some("???"));
        assert_eq!(blank, PathBuf::from("/tmp/papers/_.pdf"));
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/paper.pdf")
            .with_status(200)
            .with_body(b"%PDF-1.4 fake")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = HttpClient::new();
        let url = format!("{}/paper.pdf", server.url());

        let path = download_pdf(&client, &url, dir.path(), Some("Test Paper"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 fake");
        assert!(path.ends_with("Test_Paper.pdf"));
    }

    #[tokio::test]
    async fn test_download_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/missing.pdf")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = HttpClient::new();
        let url = format!("{}/missing.pdf", server.url());

        let err = download_pdf(&client, &url, dir.path(), Some("Missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Http(404)));
    }
}
