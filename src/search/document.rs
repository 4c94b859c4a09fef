//! Search document and query types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One article as the search layer sees it. Owned by the article corpus; the
/// fallback index holds a read-only, time-bounded copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    pub id: String,
    pub title: String,
    pub body: String,
    pub source: String,
    #[serde(default)]
    pub topics: Vec<String>,
    pub channel_name: String,
    pub published_at: DateTime<Utc>,
}

/// Field name -> distinct value -> document count. Derived, never persisted;
/// counts are a snapshot of the corpus visible at computation time.
pub type FacetSet = HashMap<String, HashMap<String, u64>>;

/// Fields facets are grouped over, in both backends.
pub const FACET_FIELDS: [&str; 3] = ["source", "topics", "channelName"];

// == Backend Mode ==
/// Which backend served a request. Reported on every search result for
/// observability and testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    Hosted,
    Fallback,
}

// == Search Options ==
/// Normalized query: free text, conjunctive filters, pagination.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub query: Option<String>,
    pub source: Option<String>,
    /// A document must carry every listed topic
    pub topics: Vec<String>,
    pub channel_name: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    /// 1-based page number
    pub page: usize,
    pub hits_per_page: usize,
}

impl SearchOptions {
    /// Canonical form of the options, used as the cache key component.
    pub fn cache_key_material(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}",
            self.query.as_deref().unwrap_or(""),
            self.source.as_deref().unwrap_or(""),
            self.topics.join(","),
            self.channel_name.as_deref().unwrap_or(""),
            self.date_from.map(|d| d.timestamp()).unwrap_or(0),
            self.date_to.map(|d| d.timestamp()).unwrap_or(0),
            self.page,
            self.hits_per_page,
        )
    }
}

/// One page of hits plus the filtered total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub hits: Vec<SearchDocument>,
    pub total_count: usize,
    pub page: usize,
}
