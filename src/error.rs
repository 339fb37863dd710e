//! Error types for node consolidation.
//!
//! This module defines all error types that can occur while building nodes,
//! assembling pipelines and calling embedding providers.

/// Result type alias for consolidation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during consolidation.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)] // "Invalid" prefix is intentional for clarity
pub enum Error {
    /// Bounding box violates `x0 <= x1`, `y0 <= y1` or has bad page dimensions
    #[error("Invalid bounding box on page {page}: {reason}")]
    InvalidBoundingBox {
        /// Page the box was anchored to
        page: u32,
        /// Which invariant was violated
        reason: String,
    },

    /// A node was constructed without any elements
    #[error("A node must contain at least one element")]
    EmptyNode,

    /// Invalid threshold, margin or missing component at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Pipeline preset name not recognised
    #[error("Unknown pipeline preset '{0}' (expected none, basic or semantic)")]
    UnknownPreset(String),

    /// Embedding provider name not recognised
    #[error("Unknown embeddings provider '{0}' (expected openai, ollama or cloudflare)")]
    UnknownProvider(String),

    /// Transport-level failure talking to an embedding provider
    #[error("{provider} embedding request failed: {message}")]
    EmbeddingRequest {
        /// Provider name
        provider: &'static str,
        /// Underlying failure
        message: String,
        /// Whether the failure is worth retrying (connect error, timeout)
        transient: bool,
    },

    /// Embedding provider answered with a non-success HTTP status
    #[error("{provider} embedding request returned HTTP {status}: {body}")]
    EmbeddingStatus {
        /// Provider name
        provider: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// Embedding provider returned a payload that breaks the capability contract
    #[error("Malformed embedding response: {0}")]
    MalformedEmbeddingResponse(String),

    /// A transient embedding failure persisted past the retry budget
    #[error("Embedding request failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Total attempts made (initial call plus retries)
        attempts: u32,
        /// The last error observed
        last: Box<Error>,
    },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether an embedding failure should be retried.
    ///
    /// Connection errors, timeouts, HTTP 429 and HTTP 5xx are transient.
    /// Everything else (bad credentials, malformed payloads) is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::EmbeddingRequest { transient, .. } => *transient,
            Error::EmbeddingStatus { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}
