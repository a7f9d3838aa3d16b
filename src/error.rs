use camino::Utf8PathBuf;

use crate::registry::PluginKind;

/// Error types for the geocoder library.
///
/// These are configuration and plumbing failures. A provider failing to
/// answer a query is a [`ProviderError`] and never surfaces as an `Error`
/// from the resolver.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No plugin of this kind is registered under the identifier.
    #[error("unknown {kind} plugin: {id}")]
    PluginNotFound { kind: PluginKind, id: String },

    /// A plugin factory rejected the options it was given.
    #[error("invalid options for plugin {id}: {reason}")]
    InvalidOptions { id: String, reason: String },

    /// Configuration file could not be read or parsed.
    #[error("invalid configuration in {path}: {reason}")]
    Config { path: Utf8PathBuf, reason: String },

    /// An address could not be rendered by a dumper.
    #[error("cannot dump address: {reason}")]
    Dump { reason: String },

    /// A JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single provider call.
///
/// All variants are recoverable: the resolver logs them and moves on to the
/// next candidate provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The backend rejected the configured credentials.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The backend answered but found nothing.
    #[error("no result: {0}")]
    NoResult(String),

    /// The backend refused the request because of a usage limit.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Transport failure or unexpected HTTP status.
    #[error("http error: {0}")]
    Http(String),

    /// The backend answered with something that could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The provider does not implement the requested operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl ProviderError {
    /// Returns `true` for credential/authorization failures.
    pub fn is_credentials(&self) -> bool {
        matches!(self, ProviderError::InvalidCredentials(_))
    }
}

/// Convenience type alias for Results using the library error.
pub type Result<T> = std::result::Result<T, Error>;
