//! Article corpus collaborator.
//!
//! The corpus itself lives outside this service; the gateway only ever reads
//! a bounded slice of recent documents to build the fallback index or to
//! re-feed the hosted one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use super::document::SearchDocument;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("No corpus accessor is configured")]
    NotConfigured,

    #[error("Corpus request failed: {0}")]
    Request(String),

    #[error("Corpus request timed out")]
    Timeout,
}

// == Article Corpus Trait ==
/// Read-only accessor for recent articles, newest first.
#[async_trait]
pub trait ArticleCorpus: Send + Sync {
    async fn fetch_recent_documents(
        &self,
        limit: usize,
    ) -> Result<Vec<SearchDocument>, CorpusError>;
}

// == HTTP Corpus ==
/// Corpus accessor over the article store's read API.
pub struct HttpCorpus {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpCorpus {
    pub fn new(http: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ArticleCorpus for HttpCorpus {
    async fn fetch_recent_documents(
        &self,
        limit: usize,
    ) -> Result<Vec<SearchDocument>, CorpusError> {
        let url = format!("{}/articles/recent", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("limit", limit)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CorpusError::Timeout
                } else {
                    CorpusError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(CorpusError::Request(format!("HTTP {}", response.status())));
        }

        let documents: Vec<SearchDocument> = response
            .json()
            .await
            .map_err(|e| CorpusError::Request(e.to_string()))?;
        debug!(count = documents.len(), "fetched recent corpus documents");
        Ok(documents)
    }
}

// == No Corpus ==
/// Stand-in when no corpus accessor is configured; every fetch reports so.
pub struct NoCorpus;

#[async_trait]
impl ArticleCorpus for NoCorpus {
    async fn fetch_recent_documents(
        &self,
        _limit: usize,
    ) -> Result<Vec<SearchDocument>, CorpusError> {
        Err(CorpusError::NotConfigured)
    }
}
