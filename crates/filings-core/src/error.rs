//! Error types for filing operations.
//!
//! This module defines [`FilingError`] which covers all error cases that can occur
//! when fetching filing indexes, decoding documents, parsing tabular exports, or
//! caching registry responses.

use thiserror::Error;

/// Errors that can occur during filing operations.
#[derive(Error, Debug)]
pub enum FilingError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a registry.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// No filer could be resolved for the query.
    #[error("Filer not found: {0}")]
    FilerNotFound(String),

    /// The requested document does not exist in the registry.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Error parsing a registry response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Document bytes could not be decoded to text.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The tabular export had too few usable lines.
    #[error("Malformed table: {0}")]
    MalformedTable(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// The requested provider is not configured.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Authentication failed for a provider.
    #[error("Authentication failed for provider {0}")]
    AuthenticationFailed(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`FilingError`].
pub type Result<T> = std::result::Result<T, FilingError>;
