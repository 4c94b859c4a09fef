//! Search Facade
//!
//! Probe-and-cache backend selection. The first caller decides between the
//! hosted index and the fallback index and every later caller shares that
//! decision; nothing re-probes implicitly. An explicit `reinitialize` (the
//! admin bulk-reindex path) is the only way to revisit the choice.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use super::corpus::{ArticleCorpus, CorpusError};
use super::document::{BackendMode, FacetSet, SearchOptions, SearchResults};
use super::hosted::HostedIndex;
use super::{FallbackIndex, SearchBackend, SearchError};

// == Search Facade ==
pub struct SearchFacade {
    hosted: Option<HostedIndex>,
    corpus: Arc<dyn ArticleCorpus>,
    fallback_limit: usize,
    /// The selected backend; empty until first use or after a reset
    backend: RwLock<Option<Arc<dyn SearchBackend>>>,
    /// Single-flight guard: concurrent first callers queue here and find the
    /// backend already built when they get through
    init_lock: Mutex<()>,
    /// Bumped on reinitialize so cached responses from the previous corpus
    /// snapshot stop being served
    generation: AtomicU64,
}

impl SearchFacade {
    pub fn new(
        hosted: Option<HostedIndex>,
        corpus: Arc<dyn ArticleCorpus>,
        fallback_limit: usize,
    ) -> Self {
        Self {
            hosted,
            corpus,
            fallback_limit,
            backend: RwLock::new(None),
            init_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Cache-key generation for responses derived from this facade.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Currently selected backend mode, `None` before first use.
    pub async fn current_mode(&self) -> Option<BackendMode> {
        self.backend.read().await.as_ref().map(|b| b.mode())
    }

    // == Initialize ==
    /// Ensures a backend is selected, building one if needed.
    pub async fn initialize(&self) -> Result<BackendMode, SearchError> {
        Ok(self.backend().await?.mode())
    }

    // == Search ==
    pub async fn search(
        &self,
        options: &SearchOptions,
    ) -> Result<(SearchResults, BackendMode), SearchError> {
        let backend = self.backend().await?;
        let results = backend.search(options).await?;
        Ok((results, backend.mode()))
    }

    // == Facets ==
    pub async fn facets(&self) -> Result<(FacetSet, BackendMode), SearchError> {
        let backend = self.backend().await?;
        let facets = backend.facets().await?;
        Ok((facets, backend.mode()))
    }

    // == Reinitialize ==
    /// Discards the selected backend and probes again. In hosted mode the
    /// recent corpus slice is also pushed to the index, so an admin reindex
    /// refreshes both backends the same way. Returns the new mode and how
    /// many documents were fed to the hosted index.
    pub async fn reinitialize(&self) -> Result<(BackendMode, usize), SearchError> {
        let _guard = self.init_lock.lock().await;
        *self.backend.write().await = None;

        let built = self.build_backend().await?;
        let mode = built.mode();

        let mut indexed = 0;
        if mode == BackendMode::Hosted {
            if let Some(hosted) = &self.hosted {
                match self.corpus.fetch_recent_documents(self.fallback_limit).await {
                    Ok(documents) => {
                        hosted.index(&documents).await?;
                        indexed = documents.len();
                    }
                    Err(CorpusError::NotConfigured) => {}
                    Err(err) => {
                        warn!(error = %err, "reindex could not read corpus, index left as-is");
                    }
                }
            }
        }

        *self.backend.write().await = Some(built);
        self.generation.fetch_add(1, Ordering::Relaxed);
        info!(mode = ?mode, indexed, "search backend reinitialized");
        Ok((mode, indexed))
    }

    /// Returns the selected backend, building it single-flight on first use.
    async fn backend(&self) -> Result<Arc<dyn SearchBackend>, SearchError> {
        if let Some(backend) = self.backend.read().await.clone() {
            return Ok(backend);
        }

        let _guard = self.init_lock.lock().await;
        // a concurrent caller may have built it while this one waited
        if let Some(backend) = self.backend.read().await.clone() {
            return Ok(backend);
        }

        let built = self.build_backend().await?;
        *self.backend.write().await = Some(built.clone());
        Ok(built)
    }

    /// Probes the hosted index, falling back to a locally built index over
    /// recent corpus documents. Callers must hold `init_lock`.
    async fn build_backend(&self) -> Result<Arc<dyn SearchBackend>, SearchError> {
        if let Some(hosted) = &self.hosted {
            match hosted.configure().await {
                Ok(()) => {
                    info!("search backed by hosted index");
                    return Ok(Arc::new(hosted.clone()));
                }
                Err(err) => {
                    warn!(error = %err, "hosted index unavailable, building fallback index");
                }
            }
        }

        let documents = self
            .corpus
            .fetch_recent_documents(self.fallback_limit)
            .await
            .map_err(|err| match err {
                CorpusError::NotConfigured => SearchError::NoBackend,
                other => SearchError::Corpus(other.to_string()),
            })?;
        if documents.is_empty() {
            return Err(SearchError::Corpus("corpus returned no documents".into()));
        }
        Ok(Arc::new(FallbackIndex::build(documents)))
    }
}
