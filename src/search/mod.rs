//! Search Module
//!
//! One search/facet API over two interchangeable backends: the hosted index
//! when it is configured and reachable, otherwise an in-process fallback
//! index built from recent corpus documents. The facade decides which backend
//! to use once per process lifetime and reports the choice on every result.

pub mod corpus;
pub mod document;
pub mod facade;
pub mod fallback;
pub mod hosted;

use async_trait::async_trait;
use thiserror::Error;

pub use corpus::{ArticleCorpus, HttpCorpus, NoCorpus};
pub use document::{BackendMode, FacetSet, SearchDocument, SearchOptions, SearchResults};
pub use facade::SearchFacade;
pub use fallback::FallbackIndex;
pub use hosted::HostedIndex;

// == Search Error Enum ==
#[derive(Error, Debug)]
pub enum SearchError {
    /// The backend is unreachable or rejected the request
    #[error("Search backend unavailable: {0}")]
    Unavailable(String),

    /// The backend did not answer within its time budget
    #[error("Search backend timed out")]
    Timeout,

    /// The corpus collaborator failed while building the fallback index
    #[error("Corpus unavailable: {0}")]
    Corpus(String),

    /// Neither the hosted index nor any corpus data is configured
    #[error("No search backend is configured")]
    NoBackend,
}

// == Search Backend Trait ==
/// Capability interface implemented by both backends. The facade selects a
/// concrete adapter via probe-and-cache instead of branching at call sites.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn mode(&self) -> BackendMode;

    async fn search(&self, options: &SearchOptions) -> Result<SearchResults, SearchError>;

    async fn facets(&self) -> Result<FacetSet, SearchError>;
}
