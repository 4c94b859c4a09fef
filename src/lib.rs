//! protestwire - Resilience gateway for a protest news aggregator
//!
//! Sits between inbound HTTP requests and three external providers (hosted
//! search index, translation engine, shared cache/rate-limit store), keeping
//! the endpoints working when a provider is degraded or absent while
//! protecting those providers from abusive call volume.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod identity;
pub mod limiter;
pub mod models;
pub mod search;
pub mod store;
pub mod tasks;
pub mod translate;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::spawn_sweep_task;
