//! Translation Pipeline
//!
//! Strictly ordered stages: validate, rate limit, sanitize, resolve source
//! language, short-circuit, cache lookup, remote translate. A rejection at
//! any stage leaves no side effects behind it.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::cache::CacheStore;
use crate::error::ApiError;
use crate::limiter::RateLimiter;
use crate::translate::provider::{ProviderError, TranslationProvider};
use crate::translate::sanitize::sanitize;
use crate::translate::{Tier, MAX_TEXT_LENGTH};

/// Characters of sanitized text folded into the cache key.
const CACHE_KEY_PREFIX_CHARS: usize = 256;

// == Translation Job ==
/// One translation request as the pipeline receives it.
#[derive(Debug, Clone)]
pub struct TranslationJob {
    pub text: String,
    pub source_lang: Option<String>,
    pub target_lang: String,
    pub auto_detect: bool,
}

// == Translation Outcome ==
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub translated_text: String,
    pub detected_language: Option<String>,
    pub source_lang: String,
    pub target_lang: String,
    pub tier: Tier,
}

/// Cached payload for one (source, target, text) triple.
#[derive(Debug, Serialize, Deserialize)]
struct CachedTranslation {
    translated_text: String,
    detected_language: Option<String>,
}

// == Translation Pipeline ==
pub struct TranslationPipeline {
    limiter: Arc<RateLimiter>,
    cache: Arc<CacheStore>,
    provider: Option<Arc<dyn TranslationProvider>>,
    cache_ttl: Duration,
}

impl TranslationPipeline {
    pub fn new(
        limiter: Arc<RateLimiter>,
        cache: Arc<CacheStore>,
        provider: Option<Arc<dyn TranslationProvider>>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            limiter,
            cache,
            provider,
            cache_ttl,
        }
    }

    // == Translate ==
    /// Runs the full pipeline for one caller-identified request.
    pub async fn translate(
        &self,
        identifier: &str,
        job: &TranslationJob,
    ) -> Result<TranslationOutcome, ApiError> {
        // 1. validate before consuming any quota
        if job.text.trim().is_empty() {
            return Err(ApiError::Validation("text must not be empty".into()));
        }
        let length = job.text.chars().count();
        if length > MAX_TEXT_LENGTH {
            return Err(ApiError::Validation(format!(
                "text exceeds maximum length of {MAX_TEXT_LENGTH} characters ({length})"
            )));
        }
        if job.target_lang.trim().is_empty() {
            return Err(ApiError::Validation("targetLang must not be empty".into()));
        }

        // 2. admission control
        let decision = self.limiter.check(identifier).await;
        if !decision.allowed {
            return Err(ApiError::from(&decision));
        }

        // 3. sanitize
        let text = sanitize(&job.text);
        if text.is_empty() {
            return Err(ApiError::Validation(
                "text is empty after sanitization".into(),
            ));
        }

        // 4. resolve source language
        let target_lang = job.target_lang.trim().to_lowercase();
        let (source_lang, detected_language) = match (&job.source_lang, job.auto_detect) {
            (Some(source), false) => (source.trim().to_lowercase(), None),
            _ => {
                let detected = self.provider()?.detect(&text).await.map_err(to_api_error)?;
                let detected = detected.to_lowercase();
                (detected.clone(), Some(detected))
            }
        };

        // 5. same-language short-circuit, no cache or remote work
        if source_lang == target_lang {
            return Ok(TranslationOutcome {
                translated_text: text,
                detected_language,
                source_lang,
                target_lang,
                tier: Tier::Skipped,
            });
        }

        // 6. cache lookup
        let key = cache_key(&source_lang, &target_lang, &text);
        if self.cache.is_available() {
            if let Some(hit) = self.cache.get_json::<CachedTranslation>(&key).await {
                debug!(source = %source_lang, target = %target_lang, "translation served from cache");
                return Ok(TranslationOutcome {
                    translated_text: hit.translated_text,
                    detected_language: detected_language.or(hit.detected_language),
                    source_lang,
                    target_lang,
                    tier: Tier::Cache,
                });
            }
        }

        // 7. remote translate, then write through
        let translated_text = self
            .provider()?
            .translate(&text, &source_lang, &target_lang)
            .await
            .map_err(to_api_error)?;
        self.cache
            .set_json(
                &key,
                &CachedTranslation {
                    translated_text: translated_text.clone(),
                    detected_language: detected_language.clone(),
                },
                self.cache_ttl,
            )
            .await;

        Ok(TranslationOutcome {
            translated_text,
            detected_language,
            source_lang,
            target_lang,
            tier: Tier::Remote,
        })
    }

    fn provider(&self) -> Result<&Arc<dyn TranslationProvider>, ApiError> {
        self.provider
            .as_ref()
            .ok_or(ApiError::ConfigurationMissing("translation provider"))
    }
}

/// Key on source, target, and a bounded prefix of the sanitized text.
fn cache_key(source: &str, target: &str, text: &str) -> String {
    let prefix: String = text.chars().take(CACHE_KEY_PREFIX_CHARS).collect();
    let digest = Sha256::digest(prefix.as_bytes());
    format!("tr:{source}:{target}:{}", hex::encode(&digest[..16]))
}

/// Provider failures become either a timeout or the single "temporarily
/// unavailable" condition; there is no local fallback for the remote call.
fn to_api_error(err: ProviderError) -> ApiError {
    if err.is_timeout() {
        ApiError::UpstreamTimeout
    } else {
        ApiError::TranslationUnavailable
    }
}
