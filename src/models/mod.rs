//! Request and Response models for the gateway API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies. Wire names are
//! camelCase throughout.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{SearchParams, TranslateRequest};
pub use responses::{
    ErrorResponse, FacetsResponse, HealthResponse, ReindexResponse, SearchResponse,
    TranslateInfoResponse, TranslateResponse,
};
