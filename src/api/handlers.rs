//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::identity::client_identifier;
use crate::limiter::RateLimiter;
use crate::models::{
    FacetsResponse, HealthResponse, ReindexResponse, SearchParams, SearchResponse,
    TranslateInfoResponse, TranslateRequest, TranslateResponse,
};
use crate::search::{SearchError, SearchFacade, SearchOptions};
use crate::translate::TranslationPipeline;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<SearchFacade>,
    pub pipeline: Arc<TranslationPipeline>,
    pub limiter: Arc<RateLimiter>,
    pub cache: Arc<CacheStore>,
    pub config: Arc<Config>,
}

/// Handler for `GET /search`
///
/// Rate-limited; consults the cache tier before the facade and writes the
/// response back through it.
pub async fn search_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    let identifier = client_identifier(&headers);
    let decision = state.limiter.check(&identifier).await;
    if !decision.allowed {
        return Err(ApiError::from(&decision));
    }

    let options = params.into_options();
    let key = search_cache_key(&state, &options);
    if let Some(cached) = state.cache.get_json::<SearchResponse>(&key).await {
        return Ok(Json(cached));
    }

    let (results, mode) = state
        .facade
        .search(&options)
        .await
        .map_err(map_search_error)?;
    let response = SearchResponse::new(results, mode);
    state
        .cache
        .set_json(
            &key,
            &response,
            Duration::from_secs(state.config.search_cache_ttl),
        )
        .await;
    Ok(Json(response))
}

/// Handler for `GET /search/facets`
pub async fn facets_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FacetsResponse>> {
    let identifier = client_identifier(&headers);
    let decision = state.limiter.check(&identifier).await;
    if !decision.allowed {
        return Err(ApiError::from(&decision));
    }

    let key = format!("facets:{}", state.facade.generation());
    if let Some(cached) = state.cache.get_json::<FacetsResponse>(&key).await {
        return Ok(Json(cached));
    }

    let (facets, mode) = state.facade.facets().await.map_err(map_search_error)?;
    let response = FacetsResponse { facets, mode };
    state
        .cache
        .set_json(
            &key,
            &response,
            Duration::from_secs(state.config.facet_cache_ttl),
        )
        .await;
    Ok(Json(response))
}

/// Handler for `POST /translate`
///
/// Validation happens here at the edge; rate limiting happens inside the
/// pipeline so a rejection leaves no side effects.
pub async fn translate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>> {
    if let Some(message) = request.validate() {
        return Err(ApiError::Validation(message));
    }

    let identifier = client_identifier(&headers);
    let outcome = state
        .pipeline
        .translate(&identifier, &request.into_job())
        .await?;
    Ok(Json(TranslateResponse::from(outcome)))
}

/// Handler for `GET /translate`
///
/// Static capability description, no side effects.
pub async fn translate_info_handler(State(state): State<AppState>) -> Json<TranslateInfoResponse> {
    let config = state.limiter.config();
    Json(TranslateInfoResponse::new(
        config.max_requests,
        config.window_ms,
    ))
}

/// Handler for `POST /admin/reindex`
///
/// Shared-secret guarded. The only path that revisits the facade's backend
/// choice; bumping the generation invalidates cached search responses.
pub async fn reindex_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReindexResponse>> {
    let expected = state
        .config
        .admin_token
        .as_deref()
        .ok_or(ApiError::Unauthorized)?;
    let presented = headers
        .get("x-admin-token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if presented != expected {
        return Err(ApiError::Unauthorized);
    }

    let (mode, documents_indexed) = state
        .facade
        .reinitialize()
        .await
        .map_err(map_search_error)?;
    info!(mode = ?mode, documents_indexed, "admin reindex complete");
    Ok(Json(ReindexResponse {
        mode,
        documents_indexed,
    }))
}

/// Handler for `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        state.facade.current_mode().await,
        state.cache.is_available(),
        state.cache.stats(),
    ))
}

fn search_cache_key(state: &AppState, options: &SearchOptions) -> String {
    let digest = Sha256::digest(options.cache_key_material().as_bytes());
    format!(
        "search:{}:{}",
        state.facade.generation(),
        hex::encode(&digest[..16])
    )
}

/// Search failures after backend selection have no further fallback; they
/// surface as upstream trouble (timeouts) or a missing-backend condition.
fn map_search_error(err: SearchError) -> ApiError {
    match err {
        SearchError::Timeout => ApiError::UpstreamTimeout,
        SearchError::NoBackend => ApiError::ConfigurationMissing("search backend"),
        SearchError::Unavailable(message) | SearchError::Corpus(message) => {
            ApiError::Internal(message)
        }
    }
}
