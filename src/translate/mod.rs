//! Translation collaborator.
//!
//! The [`Translator`] trait is the seam the pipeline depends on; the
//! production implementation is the Baidu Translate API. Every failure here
//! is per-item: callers fall back to the untranslated text or mark the
//! translation as failed, and keep going.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Credentials;
use crate::utils::HttpClient;

/// Default base URL for the Baidu Translate API
const BAIDU_API_URL: &str = "https://fanyi-api.baidu.com/api/trans/vip/translate";

/// Errors from the translation collaborator
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("translation credentials not configured")]
    Unconfigured,

    #[error("network error: {0}")]
    Network(String),

    #[error("translation API error: {0}")]
    Api(String),
}

/// Text translation between two languages
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        from_lang: &str,
        to_lang: &str,
    ) -> Result<String, TranslateError>;
}

/// Baidu Translate client.
///
/// Requests are authenticated with an MD5 signature over
/// `appid + query + salt + secret_key`.
#[derive(Clone)]
pub struct BaiduTranslator {
    client: Arc<HttpClient>,
    app_id: String,
    secret_key: String,
    base_url: String,
}

impl std::fmt::Debug for BaiduTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaiduTranslator")
            .field("app_id", &self.app_id)
            .field("secret_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl BaiduTranslator {
    /// Build a translator from a credential record; `app_id` and
    /// `secret_key` are both required.
    pub fn from_credentials(
        client: Arc<HttpClient>,
        credentials: &Credentials,
    ) -> Result<Self, TranslateError> {
        let app_id = credentials
            .app_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(TranslateError::Unconfigured)?;
        let secret_key = credentials
            .secret_key
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(TranslateError::Unconfigured)?;

        let base_url = credentials
            .base_url
            .clone()
            .unwrap_or_else(|| BAIDU_API_URL.to_string());

        Ok(Self {
            client,
            app_id: app_id.to_string(),
            secret_key: secret_key.to_string(),
            base_url,
        })
    }

    fn sign(&self, text: &str, salt: &str) -> String {
        let payload = format!("{}{}{}{}", self.app_id, text, salt, self.secret_key);
        format!("{:x}", md5::compute(payload.as_bytes()))
    }
}

#[async_trait]
impl Translator for BaiduTranslator {
    async fn translate(
        &self,
        text: &str,
        from_lang: &str,
        to_lang: &str,
    ) -> Result<String, TranslateError> {
        let salt = fastrand::u32(32768..65536).to_string();
        let sign = self.sign(text, &salt);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", text),
                ("from", from_lang),
                ("to", to_lang),
                ("appid", &self.app_id),
                ("salt", &salt),
                ("sign", &sign),
            ])
            .send()
            .await
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TranslateError::Api(format!(
                "status {}",
                response.status().as_u16()
            )));
        }

        let body: BaiduResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::Api(format!("unexpected body: {}", e)))?;

        if let Some(code) = body.error_code {
            return Err(TranslateError::Api(format!(
                "error {}: {}",
                code,
                body.error_msg.unwrap_or_default()
            )));
        }

        body.trans_result
            .and_then(|results| results.into_iter().next())
            .map(|entry| entry.dst)
            .ok_or_else(|| TranslateError::Api("empty translation result".to_string()))
    }
}

// ===== Baidu API types =====

#[derive(Debug, Deserialize)]
struct BaiduResponse {
    trans_result: Option<Vec<BaiduEntry>>,
    error_code: Option<String>,
    error_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BaiduEntry {
    dst: String,
}
