//! Sync error type: a remote failure wrapped with entity context.

use idsync_client::RemoteError;
use thiserror::Error;

/// Result alias for synchronizer operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Error raised while converging one declared object.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A remote call failed. `context` names the entity and the step that
    /// was running, so the status text is actionable on its own.
    #[error("{context}: {source}")]
    Remote {
        context: String,
        #[source]
        source: RemoteError,
    },

    /// The declared spec cannot be converged as written.
    #[error("invalid spec: {0}")]
    InvalidSpec(String),
}

impl SyncError {
    pub fn remote(context: impl Into<String>, source: RemoteError) -> Self {
        Self::Remote {
            context: context.into(),
            source,
        }
    }

    /// Whether the reconcile loop's backoff should retry this error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Remote { source, .. } => source.is_retryable(),
            Self::InvalidSpec(_) => false,
        }
    }

    /// Whether the underlying failure was remote-side absence.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Remote { source, .. } if source.is_not_found())
    }
}

/// Attaches entity context to remote-call results.
pub(crate) trait RemoteResultExt<T> {
    fn context(self, ctx: impl FnOnce() -> String) -> SyncResult<T>;
}

impl<T> RemoteResultExt<T> for Result<T, RemoteError> {
    fn context(self, ctx: impl FnOnce() -> String) -> SyncResult<T> {
        self.map_err(|e| SyncError::remote(ctx(), e))
    }
}
