//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. Provider settings are optional: a missing URL selects the
/// degraded path for that provider instead of failing startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,

    /// Rate limit ceiling per identifier per window
    pub rate_limit_max_requests: u64,
    /// Rate limit window in milliseconds
    pub rate_limit_window_ms: u64,
    /// Sweep interval for the in-process fallback window map, in seconds
    pub sweep_interval: u64,

    /// TTL for cached search responses, in seconds
    pub search_cache_ttl: u64,
    /// TTL for cached facet sets, in seconds
    pub facet_cache_ttl: u64,
    /// TTL for cached translations, in seconds (translations of a fixed
    /// text pair are assumed stable, so this is long)
    pub translation_cache_ttl: u64,

    /// Maximum number of recent documents loaded into the fallback index
    pub fallback_corpus_limit: usize,
    /// Time budget for any single remote call, in milliseconds
    pub remote_timeout_ms: u64,

    /// Shared cache/rate-limit store, e.g. redis://127.0.0.1:6379
    pub redis_url: Option<String>,
    /// Hosted search index base URL
    pub search_index_url: Option<String>,
    /// Hosted search index API key
    pub search_index_key: Option<String>,
    /// Hosted search index uid
    pub search_index_uid: String,
    /// Translation provider base URL
    pub translate_url: Option<String>,
    /// Translation provider API key
    pub translate_key: Option<String>,
    /// Article corpus accessor base URL
    pub corpus_url: Option<String>,
    /// Shared secret for admin endpoints
    pub admin_token: Option<String>,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `RATE_LIMIT_MAX_REQUESTS` - requests per window (default: 100)
    /// - `RATE_LIMIT_WINDOW_MS` - window length (default: 3600000, one hour)
    /// - `SWEEP_INTERVAL` - fallback map sweep frequency in seconds (default: 60)
    /// - `SEARCH_CACHE_TTL` / `FACET_CACHE_TTL` / `TRANSLATION_CACHE_TTL`
    /// - `FALLBACK_CORPUS_LIMIT` - fallback index size bound (default: 500)
    /// - `REMOTE_TIMEOUT_MS` - per-call budget for remote providers (default: 5000)
    /// - `REDIS_URL`, `SEARCH_INDEX_URL`, `SEARCH_INDEX_KEY`, `SEARCH_INDEX_UID`,
    ///   `TRANSLATE_URL`, `TRANSLATE_KEY`, `CORPUS_URL`, `ADMIN_TOKEN`
    pub fn from_env() -> Self {
        Self {
            server_port: parse_var("SERVER_PORT", 3000),
            rate_limit_max_requests: parse_var("RATE_LIMIT_MAX_REQUESTS", 100),
            rate_limit_window_ms: parse_var("RATE_LIMIT_WINDOW_MS", 3_600_000),
            sweep_interval: parse_var("SWEEP_INTERVAL", 60),
            search_cache_ttl: parse_var("SEARCH_CACHE_TTL", 60),
            facet_cache_ttl: parse_var("FACET_CACHE_TTL", 300),
            translation_cache_ttl: parse_var("TRANSLATION_CACHE_TTL", 2_592_000),
            fallback_corpus_limit: parse_var("FALLBACK_CORPUS_LIMIT", 500),
            remote_timeout_ms: parse_var("REMOTE_TIMEOUT_MS", 5_000),
            redis_url: optional_var("REDIS_URL"),
            search_index_url: optional_var("SEARCH_INDEX_URL"),
            search_index_key: optional_var("SEARCH_INDEX_KEY"),
            search_index_uid: env::var("SEARCH_INDEX_UID")
                .unwrap_or_else(|_| "articles".to_string()),
            translate_url: optional_var("TRANSLATE_URL"),
            translate_key: optional_var("TRANSLATE_KEY"),
            corpus_url: optional_var("CORPUS_URL"),
            admin_token: optional_var("ADMIN_TOKEN"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            rate_limit_max_requests: 100,
            rate_limit_window_ms: 3_600_000,
            sweep_interval: 60,
            search_cache_ttl: 60,
            facet_cache_ttl: 300,
            translation_cache_ttl: 2_592_000,
            fallback_corpus_limit: 500,
            remote_timeout_ms: 5_000,
            redis_url: None,
            search_index_url: None,
            search_index_key: None,
            search_index_uid: "articles".to_string(),
            translate_url: None,
            translate_key: None,
            corpus_url: None,
            admin_token: None,
        }
    }
}
