//! Remote API error taxonomy with retryability classification.

use thiserror::Error;

/// Result alias for remote API calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Error raised by a remote API call.
///
/// Absence and duplication are first-class variants so callers can build
/// create-or-update flows without string matching; everything else is
/// either an auth problem, a transient condition handled by backoff, or a
/// malformed exchange.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The named or aliased entity does not exist on the remote side.
    #[error("not found: {0}")]
    NotFound(String),

    /// A create collided with an existing entity of the same unique key.
    /// Callers may treat this as success when a create-after-check race is
    /// expected.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Authentication or token acquisition failed after the internal
    /// refresh-and-retry.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The remote side asked us to slow down.
    #[error("rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other HTTP-level failure, carrying the status for
    /// classification.
    #[error("remote api error (status {status}): {detail}")]
    Api { status: u16, detail: String },

    /// Connection-level failure before a status code was obtained.
    #[error("network error: {0}")]
    Network(String),

    /// The remote side answered with a body we could not decode.
    #[error("invalid response: {0}")]
    Parse(String),

    /// Client construction or connection configuration problem.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RemoteError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Whether the reconcile loop's backoff should retry this error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        assert!(RemoteError::Api {
            status: 503,
            detail: "unavailable".into()
        }
        .is_retryable());
        assert!(RemoteError::Network("reset".into()).is_retryable());
        assert!(RemoteError::RateLimited {
            retry_after_secs: Some(5)
        }
        .is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!RemoteError::NotFound("realm".into()).is_retryable());
        assert!(!RemoteError::Conflict("role".into()).is_retryable());
        assert!(!RemoteError::Auth("expired".into()).is_retryable());
        assert!(!RemoteError::Api {
            status: 400,
            detail: "bad".into()
        }
        .is_retryable());
    }
}
