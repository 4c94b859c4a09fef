//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    facets_handler, health_handler, reindex_handler, search_handler, translate_handler,
    translate_info_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /search` - Search articles (hosted or fallback backend)
/// - `GET /search/facets` - Facet counts over the visible corpus
/// - `POST /translate` - Translate text, reporting the serving tier
/// - `GET /translate` - Capability/usage description
/// - `POST /admin/reindex` - Rebuild the search backend (shared secret)
/// - `GET /health` - Health, cache stats, selected search mode
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(search_handler))
        .route("/search/facets", get(facets_handler))
        .route("/translate", post(translate_handler).get(translate_info_handler))
        .route("/admin/reindex", post(reindex_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
