//! API Module
//!
//! HTTP handlers and routing for the gateway REST API.
//!
//! # Endpoints
//! - `GET /search` - Search articles
//! - `GET /search/facets` - Facet counts
//! - `POST /translate` - Translate text
//! - `GET /translate` - Capability description
//! - `POST /admin/reindex` - Rebuild the search backend
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
