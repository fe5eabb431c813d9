//! Error types for the bibliographic OAI provider.
//!
//! - [`LoadError`] - Reading and parsing the XML exports
//! - [`CacheError`] - Access-decision cache persistence
//! - [`ProbeError`] - Network probing of publication URLs
//! - [`ProviderError`] - Top-level session and harvesting errors
//!
//! Only load and cache failures are fatal. Record-level problems (missing
//! names, ambiguous grant codes, unresolved cross-references) are logged and
//! the record is skipped, so they never show up here.

use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while reading one of the XML input files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed XML.
    #[error("Invalid XML in '{path}': {message}")]
    Xml { path: String, message: String },

    /// A `Record` element without an `Id` attribute.
    #[error("Record without Id attribute in '{path}'")]
    MissingId { path: String },
}

impl LoadError {
    pub(crate) fn xml(path: &str, err: impl std::fmt::Display) -> Self {
        Self::Xml {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Cache Errors
// =============================================================================

/// Errors from the access-decision cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// IO error.
    #[error("Cache IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Cache JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Probe Errors
// =============================================================================

/// Errors from the network prober. Always treated as inconclusive evidence.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// The URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Probing is switched off.
    #[error("Network probing disabled")]
    Disabled,
}

// =============================================================================
// Provider Errors (top-level)
// =============================================================================

/// Top-level errors returned by [`crate::provider::Session`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Input loading error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Cache error.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Identifier not served by this provider.
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let load_err = LoadError::MissingId {
            path: "grants.xml".into(),
        };
        let provider_err: ProviderError = load_err.into();
        assert!(provider_err.to_string().contains("grants.xml"));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let provider_err: ProviderError = CacheError::from(io).into();
        assert!(provider_err.to_string().contains("denied"));
    }

    #[test]
    fn test_xml_error_format() {
        let err = LoadError::xml("authors.xml", "unexpected EOF");
        let msg = err.to_string();
        assert!(msg.contains("authors.xml"));
        assert!(msg.contains("unexpected EOF"));
    }
}
