//! Authentication error taxonomy.

use thiserror::Error;

/// Errors produced by identity provider operations and surfaced by the
/// session coordinator.
///
/// [`AuthError::MalformedCache`] is internal: the coordinator recovers it
/// by treating the cached record as absent, and it never crosses the
/// coordinator's public boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The supplied credentials were rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The identity provider could not be reached.
    #[error("identity provider unreachable: {0}")]
    NetworkUnavailable(String),

    /// The remote session no longer exists or has been revoked.
    #[error("session expired")]
    SessionExpired,

    /// The persisted session record could not be decoded.
    #[error("malformed persisted session record: {0}")]
    MalformedCache(String),

    /// Any other provider failure.
    #[error("identity provider error: {0}")]
    Unknown(String),
}

impl AuthError {
    /// Checks if this is a connectivity failure.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::NetworkUnavailable(_))
    }

    /// Checks if this is a credential rejection.
    #[must_use]
    pub const fn is_invalid_credentials(&self) -> bool {
        matches!(self, Self::InvalidCredentials)
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
