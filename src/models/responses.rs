//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies. Search and facet
//! responses also round-trip through the cache tier, so they derive
//! `Deserialize` as well.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::search::{BackendMode, FacetSet, SearchDocument, SearchResults};
use crate::translate::{Tier, TranslationOutcome, MAX_TEXT_LENGTH};

/// Response body for `GET /search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub hits: Vec<SearchDocument>,
    pub total_count: usize,
    pub page: usize,
    pub mode: BackendMode,
}

impl SearchResponse {
    pub fn new(results: SearchResults, mode: BackendMode) -> Self {
        Self {
            hits: results.hits,
            total_count: results.total_count,
            page: results.page,
            mode,
        }
    }
}

/// Response body for `GET /search/facets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetsResponse {
    pub facets: FacetSet,
    pub mode: BackendMode,
}

/// Response body for `POST /translate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
    pub detected_language: Option<String>,
    pub source_lang: String,
    pub target_lang: String,
    pub tier: Tier,
}

impl From<TranslationOutcome> for TranslateResponse {
    fn from(outcome: TranslationOutcome) -> Self {
        Self {
            translated_text: outcome.translated_text,
            detected_language: outcome.detected_language,
            source_lang: outcome.source_lang,
            target_lang: outcome.target_lang,
            tier: outcome.tier,
        }
    }
}

/// Static capability description served by `GET /translate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateInfoResponse {
    pub service: &'static str,
    pub max_text_length: usize,
    pub tiers: [&'static str; 3],
    pub rate_limit: RateLimitInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    pub limit: u64,
    pub window_ms: u64,
}

impl TranslateInfoResponse {
    pub fn new(limit: u64, window_ms: u64) -> Self {
        Self {
            service: "translation",
            max_text_length: MAX_TEXT_LENGTH,
            tiers: ["cache", "remote", "skipped"],
            rate_limit: RateLimitInfo { limit, window_ms },
        }
    }
}

/// Response body for `POST /admin/reindex`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReindexResponse {
    pub mode: BackendMode,
    pub documents_indexed: usize,
}

/// Response body for the health endpoint (`GET /health`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Selected search backend, absent before first use
    pub search_mode: Option<BackendMode>,
    pub cache_available: bool,
    pub cache: crate::cache::CacheStatsSnapshot,
}

impl HealthResponse {
    pub fn healthy(
        search_mode: Option<BackendMode>,
        cache_available: bool,
        stats: &CacheStats,
    ) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
            search_mode,
            cache_available,
            cache: stats.snapshot(),
        }
    }
}

/// Error response body for all error conditions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}
