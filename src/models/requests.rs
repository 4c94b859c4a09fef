//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::search::SearchOptions;
use crate::translate::{TranslationJob, MAX_TEXT_LENGTH};

const DEFAULT_HITS_PER_PAGE: usize = 20;
const MAX_HITS_PER_PAGE: usize = 100;

/// Query string accepted by `GET /search`.
///
/// `topics` arrives as a comma-separated list; dates as RFC 3339.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub source: Option<String>,
    pub topics: Option<String>,
    pub channel_name: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl SearchParams {
    /// Normalizes the raw query string into search options, clamping
    /// pagination into a sane range.
    pub fn into_options(self) -> SearchOptions {
        let topics = self
            .topics
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        SearchOptions {
            query: self.q.filter(|q| !q.trim().is_empty()),
            source: self.source.filter(|s| !s.trim().is_empty()),
            topics,
            channel_name: self.channel_name.filter(|c| !c.trim().is_empty()),
            date_from: self.date_from,
            date_to: self.date_to,
            page: self.page.unwrap_or(1).max(1),
            hits_per_page: self
                .limit
                .unwrap_or(DEFAULT_HITS_PER_PAGE)
                .clamp(1, MAX_HITS_PER_PAGE),
        }
    }
}

/// Request body for `POST /translate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: String,
    #[serde(default)]
    pub source_lang: Option<String>,
    pub target_lang: String,
    #[serde(default)]
    pub auto_detect: bool,
}

impl TranslateRequest {
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid. The
    /// pipeline re-checks its own invariants; this catches malformed bodies
    /// at the edge.
    pub fn validate(&self) -> Option<String> {
        if self.text.trim().is_empty() {
            return Some("text must not be empty".to_string());
        }
        if self.text.chars().count() > MAX_TEXT_LENGTH {
            return Some(format!(
                "text exceeds maximum length of {MAX_TEXT_LENGTH} characters"
            ));
        }
        if self.target_lang.trim().is_empty() {
            return Some("targetLang must not be empty".to_string());
        }
        None
    }

    pub fn into_job(self) -> TranslationJob {
        TranslationJob {
            text: self.text,
            source_lang: self.source_lang,
            target_lang: self.target_lang,
            auto_detect: self.auto_detect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_request_deserialize() {
        let json = r#"{"text": "Hello", "targetLang": "fa"}"#;
        let req: TranslateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.text, "Hello");
        assert_eq!(req.target_lang, "fa");
        assert!(req.source_lang.is_none());
        assert!(!req.auto_detect);
    }

    #[test]
    fn test_translate_request_auto_detect() {
        let json = r#"{"text": "سلام دنیا", "targetLang": "en", "autoDetect": true}"#;
        let req: TranslateRequest = serde_json::from_str(json).unwrap();
        assert!(req.auto_detect);
    }

    #[test]
    fn test_validate_empty_text() {
        let req = TranslateRequest {
            text: "  ".to_string(),
            source_lang: None,
            target_lang: "en".to_string(),
            auto_detect: false,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_over_length_text() {
        let req = TranslateRequest {
            text: "x".repeat(MAX_TEXT_LENGTH + 1),
            source_lang: None,
            target_lang: "en".to_string(),
            auto_detect: false,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req = TranslateRequest {
            text: "Hello".to_string(),
            source_lang: Some("en".to_string()),
            target_lang: "fa".to_string(),
            auto_detect: false,
        };
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_search_params_topics_split() {
        let params = SearchParams {
            topics: Some("strike, labor ,,".to_string()),
            ..Default::default()
        };
        let options = params.into_options();
        assert_eq!(options.topics, vec!["strike", "labor"]);
    }

    #[test]
    fn test_search_params_pagination_clamped() {
        let params = SearchParams {
            page: Some(0),
            limit: Some(10_000),
            ..Default::default()
        };
        let options = params.into_options();
        assert_eq!(options.page, 1);
        assert_eq!(options.hits_per_page, MAX_HITS_PER_PAGE);
    }

    #[test]
    fn test_search_params_defaults() {
        let options = SearchParams::default().into_options();
        assert_eq!(options.page, 1);
        assert_eq!(options.hits_per_page, DEFAULT_HITS_PER_PAGE);
        assert!(options.query.is_none());
        assert!(options.topics.is_empty());
    }

    #[test]
    fn test_search_params_blank_query_dropped() {
        let params = SearchParams {
            q: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(params.into_options().query.is_none());
    }
}
