//! Remote translation provider client.
//!
//! Speaks a LibreTranslate-compatible REST protocol: `/detect` for language
//! detection and `/translate` for the translation itself.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider rate limit exceeded")]
    RateLimited,

    #[error("Provider quota exhausted")]
    QuotaExhausted,

    #[error("Provider request timed out")]
    Timeout,

    #[error("Provider error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Whether the failure is a remote-call timeout rather than a provider
    /// condition; callers surface these differently.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout)
    }
}

// == Translation Provider Trait ==
/// Language detection and translation, as the pipeline consumes them.
/// Implemented by `RemoteTranslator` for production; test doubles elsewhere.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn detect(&self, text: &str) -> Result<String, ProviderError>;

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Deserialize)]
struct DetectCandidate {
    language: String,
}

#[derive(Debug, Deserialize)]
struct TranslateBody {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

// == Remote Translator ==
#[derive(Clone)]
pub struct RemoteTranslator {
    http: Client,
    base_url: String,
    api_key: Option<ApiKey>,
    timeout: Duration,
}

impl RemoteTranslator {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.map(ApiKey),
            timeout,
        }
    }

    async fn post(
        &self,
        path: &str,
        mut body: serde_json::Value,
    ) -> Result<reqwest::Response, ProviderError> {
        if let Some(key) = &self.api_key {
            body["api_key"] = json!(key.0);
        }
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Network(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        warn!(status = %status, path, "translation provider error");
        Err(match status {
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
            StatusCode::FORBIDDEN => ProviderError::QuotaExhausted,
            other => ProviderError::Api {
                code: other.as_u16(),
                message: response.text().await.unwrap_or_default(),
            },
        })
    }
}

#[async_trait]
impl TranslationProvider for RemoteTranslator {
    async fn detect(&self, text: &str) -> Result<String, ProviderError> {
        let response = self.post("/detect", json!({ "q": text })).await?;
        let candidates: Vec<DetectCandidate> = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        // candidates arrive ordered by confidence
        let language = candidates
            .into_iter()
            .next()
            .map(|c| c.language)
            .ok_or_else(|| ProviderError::Malformed("empty detection result".into()))?;
        debug!(language, "detected source language");
        Ok(language)
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError> {
        let body = json!({
            "q": text,
            "source": source,
            "target": target,
            "format": "text",
        });
        let response = self.post("/translate", body).await?;
        let body: TranslateBody = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(body.translated_text)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RemoteTranslator {
        RemoteTranslator::new(
            Client::new(),
            server.uri(),
            Some("test-key".to_string()),
            Duration::from_secs(2),
        )
    }

    #[tokio::test]
    async fn detect_returns_top_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/detect"))
            .and(body_partial_json(serde_json::json!({"q": "سلام دنیا"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"language": "fa", "confidence": 92.0},
                {"language": "ar", "confidence": 6.5}
            ])))
            .mount(&server)
            .await;

        let language = client(&server).detect("سلام دنیا").await.unwrap();
        assert_eq!(language, "fa");
    }

    #[tokio::test]
    async fn detect_empty_result_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/detect"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let err = client(&server).detect("hello").await.unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[tokio::test]
    async fn translate_returns_translated_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_partial_json(serde_json::json!({
                "q": "سلام دنیا",
                "source": "fa",
                "target": "en"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "translatedText": "Hello world"
            })))
            .mount(&server)
            .await;

        let text = client(&server).translate("سلام دنیا", "fa", "en").await.unwrap();
        assert_eq!(text, "Hello world");
    }

    #[tokio::test]
    async fn translate_429_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = client(&server).translate("hi", "en", "fa").await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited));
    }

    #[tokio::test]
    async fn translate_5xx_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        match client(&server).translate("hi", "en", "fa").await.unwrap_err() {
            ProviderError::Api { code: 500, message } => assert!(message.contains("boom")),
            other => panic!("expected Api(500), got: {other:?}"),
        }
    }
}
