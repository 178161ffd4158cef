use miette::Diagnostic;
use thiserror::Error;

use crate::store::StoreError;

/// Main error type for the scheduling core
///
/// Every business-rule violation is surfaced as one of these variants; no
/// panic or backend error crosses the service boundary untyped.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// Entity absent, or a read the caller is not allowed to distinguish
    /// from absence (event reads deliberately conflate the two).
    #[error("not found: {0}")]
    #[diagnostic(code(aikataulu::not_found))]
    NotFound(String),

    #[error("forbidden: {0}")]
    #[diagnostic(code(aikataulu::forbidden))]
    Forbidden(String),

    #[error("invalid argument: {0}")]
    #[diagnostic(code(aikataulu::invalid_argument))]
    InvalidArgument(String),

    #[error("unrecognized participant status: {0}")]
    #[diagnostic(code(aikataulu::invalid_status))]
    InvalidStatus(String),

    /// The owner's own participation is pinned to Accepted.
    #[error("the event owner's participation status is fixed to Accepted")]
    #[diagnostic(code(aikataulu::owner_status_fixed))]
    OwnerStatusFixed,

    /// A write was acknowledged but matched or modified zero documents,
    /// implying a race or a stale reference.
    #[error("store inconsistency: {0}")]
    #[diagnostic(code(aikataulu::store_inconsistency))]
    StoreInconsistency(String),

    #[error("store error: {0}")]
    #[diagnostic(code(aikataulu::store))]
    Store(#[from] StoreError),

    #[error("environment error: {0}")]
    #[diagnostic(code(aikataulu::environment))]
    Environment(String),

    #[error("configuration error: {0}")]
    #[diagnostic(code(aikataulu::config))]
    Config(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type CoreResult<T> = Result<T, Error>;

/// Helper to create not-found errors
pub fn not_found(what: &str) -> Error {
    Error::NotFound(what.to_string())
}

/// Helper to create forbidden errors
pub fn forbidden(message: &str) -> Error {
    Error::Forbidden(message.to_string())
}

/// Helper to create invalid-argument errors
pub fn invalid_argument(message: &str) -> Error {
    Error::InvalidArgument(message.to_string())
}

/// Helper to create store-inconsistency errors
pub fn store_inconsistency(message: &str) -> Error {
    Error::StoreInconsistency(message.to_string())
}

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}
