//! Handler chain: ordered steps over one declared object.

use async_trait::async_trait;
use idsync_client::RemoteClient;
use idsync_core::object::{DeclaredObject, ResourceSpec};
use idsync_sync::SyncResult;
use tracing::debug;

use crate::error::{ReconcileError, ReconcileResult};

/// One step of a convergence chain.
///
/// Handlers may record learned facts (the remote entity id) on the
/// object; the reconcile loop persists those together with the status. A
/// handler with nothing to do returns success.
#[async_trait]
pub trait Handler<S: ResourceSpec>: Send + Sync {
    /// Step name used in log output and failure status text.
    fn name(&self) -> &'static str;

    async fn handle(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<S>,
    ) -> SyncResult<()>;
}

/// Ordered handlers; the first failure stops the chain.
pub struct Chain<S> {
    handlers: Vec<Box<dyn Handler<S>>>,
}

impl<S: ResourceSpec> Chain<S> {
    #[must_use]
    pub fn new(handlers: Vec<Box<dyn Handler<S>>>) -> Self {
        Self { handlers }
    }

    /// Run every handler in order against the object.
    pub async fn run(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<S>,
    ) -> ReconcileResult<()> {
        for handler in &self.handlers {
            debug!(object = %object.key(), handler = handler.name(), "running handler");
            handler
                .handle(client, object)
                .await
                .map_err(|source| ReconcileError::Handler {
                    handler: handler.name(),
                    source,
                })?;
        }
        Ok(())
    }
}
