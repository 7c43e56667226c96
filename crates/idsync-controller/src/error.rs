//! Controller error type.

use idsync_client::RemoteError;
use idsync_sync::SyncError;
use thiserror::Error;

/// Result alias for controller operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Error raised by one reconcile pass.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The spec store failed to load or persist an object.
    #[error("spec store: {0}")]
    Store(String),

    /// The object's connection is missing or its client could not be
    /// built. Requeued on the not-available interval without growing the
    /// failure count.
    #[error("connection not available: {0}")]
    ConnectionNotAvailable(String),

    /// A handler failed; `handler` names the step for the status text.
    #[error("handler {handler}: {source}")]
    Handler {
        handler: &'static str,
        #[source]
        source: SyncError,
    },

    /// The deletion terminator failed.
    #[error("terminating: {0}")]
    Terminate(#[source] SyncError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}
