//! Keyword extraction through a hosted language model.
//!
//! One chat-completion call with a fixed instruction turns the operator's
//! free-text research interest into at most two search keywords. The model
//! reply is free-form text expected to contain a JSON object shaped
//! `{"keywords": ["a", "b"]}`; the object is dug out of surrounding prose.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Credentials;
use crate::utils::HttpClient;

/// Default chat-completions endpoint (ChatGLM open platform)
const CHATGLM_API_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";
/// Model used for keyword generation
const DEFAULT_MODEL: &str = "glm-4-airx";
/// Upper bound on keywords returned, whatever the model sends back
const MAX_KEYWORDS: usize = 2;

const SYSTEM_PROMPT: &str = "\
You turn a research interest into search keywords for academic paper \
databases. Reply with a JSON object containing a single field `keywords`, \
an array of exactly the two keywords that fit the user's input most \
closely. If the input only contains one distinguishable concept, use a \
synonym of that concept as the second keyword; never invent an unrelated \
term. The output must be JSON.";

/// Errors from the keyword extraction stage
#[derive(Debug, thiserror::Error)]
pub enum KeywordError {
    #[error("no API key configured for the keyword model")]
    Unconfigured,

    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("model reply did not contain the expected keyword JSON")]
    MalformedResponse,
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Client for the keyword-generation model
#[derive(Debug, Clone)]
pub struct KeywordClient {
    client: Arc<HttpClient>,
    api_key: ApiKey,
    base_url: String,
    model: String,
}

impl KeywordClient {
    /// Build a client from a credential record; the API key is required.
    pub fn from_credentials(
        client: Arc<HttpClient>,
        credentials: &Credentials,
    ) -> Result<Self, KeywordError> {
        let api_key = credentials
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(KeywordError::Unconfigured)?;

        let base_url = credentials
            .base_url
            .clone()
            .unwrap_or_else(|| CHATGLM_API_URL.to_string());

        Ok(Self {
            client,
            api_key: ApiKey(api_key.to_string()),
            base_url,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Extract at most two search keywords from the operator's free text.
    pub async fn extract_keywords(&self, free_text: &str) -> Result<Vec<String>, KeywordError> {
        let reply = self.complete(free_text).await?;

        let object = extract_json_object(&reply).ok_or(KeywordError::MalformedResponse)?;
        let payload: KeywordPayload =
            serde_json::from_str(object).map_err(|_| KeywordError::MalformedResponse)?;

        let mut keywords = payload.keywords.ok_or(KeywordError::MalformedResponse)?;
        keywords.truncate(MAX_KEYWORDS);
        tracing::debug!(?keywords, "extracted keywords");
        Ok(keywords)
    }

    async fn complete(&self, user_text: &str) -> Result<String, KeywordError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_text.to_string(),
                },
            ],
        };

        let response = self
            .client
            .client()
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key.0))
            .json(&request)
            .send()
            .await
            .map_err(|e| KeywordError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            let snippet = message.chars().take(200).collect::<String>();
            return Err(KeywordError::Api {
                status: status.as_u16(),
                message: snippet,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|_| KeywordError::MalformedResponse)?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(KeywordError::MalformedResponse)
    }
}

/// Find the first well-formed JSON object substring in `text`.
///
/// Tolerates prose and code fences around the object; brace counting is
/// string-aware so braces inside JSON strings do not unbalance the scan.
fn extract_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if start.is_some() && in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' if start.is_some() => in_string = true,
            b'{' => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if start.is_some() => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start.unwrap()..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

// ===== Chat API types =====

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct KeywordPayload {
    keywords: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> KeywordClient {
        let credentials = Credentials {
            api_key: Some("test-key".to_string()),
            base_url: Some(base_url.to_string()),
            ..Default::default()
        };
        KeywordClient::from_credentials(Arc::new(HttpClient::new()), &credentials).unwrap()
    }

    #[test]
    fn test_extract_json_object_with_prose() {
        let text = "Sure! Here are your keywords:\n```json\n{\"keywords\": [\"a\", \"b\"]}\n```";
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"keywords": ["a", "b"]}"#)
        );
    }

    #[test]
    fn test_extract_json_object_nested_and_string_braces() {
        let text = r#"note {"keywords": ["{a}", "b"], "meta": {"n": 1}} trailing"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"keywords": ["{a}", "b"], "meta": {"n": 1}}"#)
        );
    }

    #[test]
    fn test_extract_json_object_absent() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("unbalanced { brace"), None);
    }

    #[test]
    fn test_missing_api_key_is_unconfigured() {
        let err =
            KeywordClient::from_credentials(Arc::new(HttpClient::new()), &Credentials::default())
                .unwrap_err();
        assert!(matches!(err, KeywordError::Unconfigured));
    }

    async fn run_with_reply(reply: &str) -> Result<Vec<String>, KeywordError> {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": reply}}]
        });
        let _m = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        client(&server.url()).extract_keywords("photonic computing").await
    }

    #[tokio::test]
    async fn test_keywords_extracted_and_bounded() {
        let keywords = run_with_reply(r#"{"keywords": ["wave optics", "photonics", "extra"]}"#)
            .await
            .unwrap();
        assert_eq!(keywords, vec!["wave optics", "photonics"]);
    }

    #[tokio::test]
    async fn test_single_keyword_passes_through() {
        let keywords = run_with_reply(r#"{"keywords": ["optics"]}"#).await.unwrap();
        assert_eq!(keywords, vec!["optics"]);
    }

    #[tokio::test]
    async fn test_missing_keywords_field_is_malformed() {
        let err = run_with_reply(r#"{"topics": ["optics"]}"#).await.unwrap_err();
        assert!(matches!(err, KeywordError::MalformedResponse));
    }

    #[tokio::test]
    async fn test_no_json_object_is_malformed() {
        let err = run_with_reply("I could not find any keywords.")
            .await
            .unwrap_err();
        assert!(matches!(err, KeywordError::MalformedResponse));
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = client(&server.url())
            .extract_keywords("anything")
            .await
            .unwrap_err();
        assert!(matches!(err, KeywordError::Api { status: 429, .. }));
    }
}
