//! Translation Module
//!
//! Orchestrates sanitization, rate limiting, optional language detection,
//! cache lookup, and the remote translation call, reporting which tier
//! satisfied each request.

pub mod pipeline;
pub mod provider;
pub mod sanitize;

pub use pipeline::{TranslationJob, TranslationOutcome, TranslationPipeline};
pub use provider::{ProviderError, RemoteTranslator, TranslationProvider};

use serde::{Deserialize, Serialize};

// == Public Constants ==
/// Maximum accepted input length, in characters
pub const MAX_TEXT_LENGTH: usize = 10_000;

// == Tier ==
/// Which stage satisfied a translation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Source and target language were equal, input returned unchanged
    Skipped,
    /// Served from the cache tier
    Cache,
    /// Served by the remote provider
    Remote,
}
