//! In-process fallback index.
//!
//! A bounded, rebuildable copy of the most recent corpus documents, queried
//! entirely in memory when the hosted index is unavailable. Filters are a
//! conjunction of predicates; free text is approximate (substring or
//! single-edit token match) and ranks hits by score, ties by recency.

use async_trait::async_trait;
use tracing::info;

use super::document::{
    BackendMode, FacetSet, SearchDocument, SearchOptions, SearchResults, FACET_FIELDS,
};
use super::{SearchBackend, SearchError};

// == Fallback Index ==
pub struct FallbackIndex {
    documents: Vec<SearchDocument>,
}

impl FallbackIndex {
    /// Builds the index from corpus documents, newest first.
    pub fn build(mut documents: Vec<SearchDocument>) -> Self {
        documents.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        info!(count = documents.len(), "built fallback search index");
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn matches_filters(document: &SearchDocument, options: &SearchOptions) -> bool {
        if let Some(source) = &options.source {
            if !document.source.eq_ignore_ascii_case(source) {
                return false;
            }
        }
        if let Some(channel) = &options.channel_name {
            if !document.channel_name.eq_ignore_ascii_case(channel) {
                return false;
            }
        }
        // topic filter is conjunctive: every requested topic must be present
        if !options.topics.iter().all(|topic| {
            document
                .topics
                .iter()
                .any(|t| t.eq_ignore_ascii_case(topic))
        }) {
            return false;
        }
        if let Some(from) = options.date_from {
            if document.published_at < from {
                return false;
            }
        }
        if let Some(to) = options.date_to {
            if document.published_at > to {
                return false;
            }
        }
        true
    }

    /// Match score for the free-text query; 0 means no match. Title hits
    /// outweigh body hits, fuzzy token hits count least.
    fn score(document: &SearchDocument, tokens: &[String]) -> u32 {
        let title = document.title.to_lowercase();
        let body = document.body.to_lowercase();

        let mut total = 0;
        for token in tokens {
            if title.contains(token) {
                total += 3;
            } else if body.contains(token) {
                total += 2;
            } else if title
                .split_whitespace()
                .chain(body.split_whitespace())
                .any(|word| within_one_edit(word, token))
            {
                total += 1;
            }
        }
        total
    }
}

#[async_trait]
impl SearchBackend for FallbackIndex {
    fn mode(&self) -> BackendMode {
        BackendMode::Fallback
    }

    async fn search(&self, options: &SearchOptions) -> Result<SearchResults, SearchError> {
        let tokens: Vec<String> = options
            .query
            .as_deref()
            .unwrap_or("")
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        let mut scored: Vec<(u32, &SearchDocument)> = self
            .documents
            .iter()
            .filter(|doc| Self::matches_filters(doc, options))
            .filter_map(|doc| {
                if tokens.is_empty() {
                    Some((0, doc))
                } else {
                    let score = Self::score(doc, &tokens);
                    (score > 0).then_some((score, doc))
                }
            })
            .collect();

        // documents arrive newest first, so a stable sort keeps recency as
        // the tiebreaker
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let total_count = scored.len();
        let page = options.page.max(1);
        let per_page = options.hits_per_page.max(1);
        let hits = scored
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .map(|(_, doc)| doc.clone())
            .collect();

        Ok(SearchResults {
            hits,
            total_count,
            page,
        })
    }

    async fn facets(&self) -> Result<FacetSet, SearchError> {
        let mut facets = FacetSet::new();
        for field in FACET_FIELDS {
            facets.insert(field.to_string(), Default::default());
        }

        for document in &self.documents {
            bump(&mut facets, "source", &document.source);
            bump(&mut facets, "channelName", &document.channel_name);
            for topic in &document.topics {
                bump(&mut facets, "topics", topic);
            }
        }
        Ok(facets)
    }
}

fn bump(facets: &mut FacetSet, field: &str, value: &str) {
    if let Some(values) = facets.get_mut(field) {
        *values.entry(value.to_string()).or_insert(0) += 1;
    }
}

/// True when `a` and `b` are within Levenshtein distance one.
fn within_one_edit(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if long.len() - short.len() > 1 {
        return false;
    }

    let mut i = 0;
    let mut j = 0;
    let mut edits = 0;
    while i < short.len() && j < long.len() {
        if short[i] == long[j] {
            i += 1;
            j += 1;
            continue;
        }
        edits += 1;
        if edits > 1 {
            return false;
        }
        if short.len() == long.len() {
            // substitution
            i += 1;
        }
        j += 1;
    }
    edits + (long.len() - j) + (short.len() - i) <= 1
}
