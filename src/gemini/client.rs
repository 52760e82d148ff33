//! `GeminiClient`: POSTs `generateContent` requests.
//!
//! All connection details (base URL, key, timeout) come from
//! [`GeminiConfig`]; the model and the request body are chosen per call by
//! the adapters.

use serde_json::{json, Value};
use thiserror::Error;

use crate::config::GeminiConfig;

// ---------------------------------------------------------------------------
// GeminiError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the remote service.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// No API key is configured; the request was not sent.
    #[error("API key is not configured")]
    MissingApiKey,

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response (or its structured payload) could not be parsed.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The response carried no usable content.
    #[error("response contained no usable content")]
    EmptyResponse,
}

impl From<reqwest::Error> for GeminiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GeminiError::Timeout
        } else {
            GeminiError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// `contents` array holding a single user turn with one text part.
pub fn user_contents(text: &str) -> Value {
    json!([{ "role": "user", "parts": [{ "text": text }] }])
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Shared HTTP client for all remote model calls.
///
/// Cloning is cheap (`reqwest::Client` is reference counted).
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Build a client from config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`; a default client is used if the builder fails.
    pub fn from_config(config: &GeminiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key().map(str::to_string),
        }
    }

    /// Whether remote calls can be attempted at all.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// `generateContent` URL for `model`.
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// POST `body` to the `generateContent` endpoint of `model` and return the
    /// parsed JSON response.
    ///
    /// Fails fast with [`GeminiError::MissingApiKey`] when no key is set.
    pub async fn generate_content(&self, model: &str, body: &Value) -> Result<Value, GeminiError> {
        let key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(api_key: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            base_url: "https://example.invalid/".into(),
            api_key: api_key.map(str::to_string),
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn endpoint_joins_base_url_and_model() {
        let client = GeminiClient::from_config(&make_config(Some("k")));
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "https://example.invalid/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn blank_key_counts_as_missing() {
        assert!(!GeminiClient::from_config(&make_config(Some(""))).has_api_key());
        assert!(!GeminiClient::from_config(&make_config(None)).has_api_key());
        assert!(GeminiClient::from_config(&make_config(Some("abc"))).has_api_key());
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = GeminiClient::from_config(&make_config(None));
        let result = client
            .generate_content("gemini-2.5-flash", &json!({}))
            .await;
        assert!(matches!(result, Err(GeminiError::MissingApiKey)));
    }

    #[test]
    fn user_contents_wraps_text() {
        let contents = user_contents("hello");
        assert_eq!(contents[0]["parts"][0]["text"], "hello");
        assert_eq!(contents[0]["role"], "user");
    }
}
