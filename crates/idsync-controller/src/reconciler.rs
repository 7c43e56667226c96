//! The reconcile loop: load, terminate or converge, write status, compute
//! the requeue delay.

use std::sync::Arc;
use std::time::Duration;

use idsync_core::object::{DeclaredObject, ResourceSpec};
use tracing::{debug, info, warn};

use crate::chain::Chain;
use crate::connection::ConnectionRegistry;
use crate::error::ReconcileError;
use crate::store::SpecStore;
use crate::terminator::Terminator;

/// Timing knobs of the loop.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Backoff unit; the delay after `n` consecutive failures is
    /// `base_backoff * n`, capped at `max_backoff`.
    pub base_backoff: Duration,
    pub max_backoff: Duration,

    /// Requeue delay after a successful pass.
    pub steady_interval: Duration,

    /// Fixed requeue delay while the object's connection is unavailable.
    /// Does not grow the failure count.
    pub not_available_interval: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            base_backoff: Duration::from_secs(10),
            max_backoff: Duration::from_secs(300),
            steady_interval: Duration::from_secs(600),
            not_available_interval: Duration::from_secs(60),
        }
    }
}

/// Result of one pass, consumed immediately by the driving scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Error text of a failed pass, also written to the object status.
    pub error: Option<String>,
    /// When the scheduler should run the next pass. Zero means the object
    /// is gone and needs no further passes.
    pub requeue_after: Duration,
}

impl ReconcileOutcome {
    /// Terminal: the object no longer exists.
    #[must_use]
    pub fn done() -> Self {
        Self {
            error: None,
            requeue_after: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn after(requeue_after: Duration) -> Self {
        Self {
            error: None,
            requeue_after,
        }
    }

    #[must_use]
    pub fn failed(error: String, requeue_after: Duration) -> Self {
        Self {
            error: Some(error),
            requeue_after,
        }
    }
}

/// Drives one kind's objects toward their declared state.
///
/// The loop owns all status mutation. Callers must keep at most one pass
/// in flight per object name; within a pass every remote call runs
/// sequentially, and dropping the returned future aborts the pass at the
/// next I/O boundary (the next pass retries from scratch).
pub struct Reconciler<S: ResourceSpec> {
    store: Arc<dyn SpecStore<S>>,
    connections: Arc<ConnectionRegistry>,
    chain: Chain<S>,
    terminator: Box<dyn Terminator<S>>,
    config: ReconcilerConfig,
    finalizer: String,
}

impl<S: ResourceSpec> Reconciler<S> {
    pub fn new(
        store: Arc<dyn SpecStore<S>>,
        connections: Arc<ConnectionRegistry>,
        chain: Chain<S>,
        terminator: Box<dyn Terminator<S>>,
        config: ReconcilerConfig,
    ) -> Self {
        let finalizer = format!("idsync/{}", S::KIND.to_lowercase());
        Self {
            store,
            connections,
            chain,
            terminator,
            config,
            finalizer,
        }
    }

    /// Run one pass for the named object.
    pub async fn reconcile(&self, name: &str) -> ReconcileOutcome {
        let object = match self.store.get(name).await {
            Ok(Some(object)) => object,
            Ok(None) => {
                debug!(kind = S::KIND, name, "object gone, nothing to do");
                return ReconcileOutcome::done();
            }
            Err(e) => {
                warn!(kind = S::KIND, name, error = %e, "failed to load object");
                return ReconcileOutcome::failed(e.to_string(), self.config.base_backoff);
            }
        };

        if object.deletion_requested {
            self.terminate(object).await
        } else {
            self.converge(object).await
        }
    }

    async fn converge(&self, mut object: DeclaredObject<S>) -> ReconcileOutcome {
        if object.ensure_finalizer(&self.finalizer) {
            if let Err(e) = self.store.persist(&object).await {
                return ReconcileOutcome::failed(e.to_string(), self.config.base_backoff);
            }
        }

        let client = match self.connections.client_for(&object.connection) {
            Ok(client) => client,
            Err(e @ ReconcileError::ConnectionNotAvailable(_)) => {
                debug!(object = %object.key(), error = %e, "connection not available");
                return ReconcileOutcome::failed(
                    e.to_string(),
                    self.config.not_available_interval,
                );
            }
            Err(e) => return self.fail(object, e).await,
        };

        match self.chain.run(&client, &mut object).await {
            Ok(()) => {
                object.set_success_status();
                if let Err(e) = self.store.persist(&object).await {
                    return ReconcileOutcome::failed(e.to_string(), self.config.base_backoff);
                }
                info!(object = %object.key(), "converged");
                ReconcileOutcome::after(self.config.steady_interval)
            }
            Err(e) => self.fail(object, e).await,
        }
    }

    async fn terminate(&self, mut object: DeclaredObject<S>) -> ReconcileOutcome {
        if object.finalizer.is_none() {
            // Nothing gates the purge.
            if let Err(e) = self.store.persist(&object).await {
                return ReconcileOutcome::failed(e.to_string(), self.config.base_backoff);
            }
            return ReconcileOutcome::done();
        }

        // The escape hatch short-circuits before any remote call.
        if object.preserve_on_deletion {
            info!(object = %object.key(), "preserving remote entity on deletion");
        } else {
            let client = match self.connections.client_for(&object.connection) {
                Ok(client) => client,
                Err(e @ ReconcileError::ConnectionNotAvailable(_)) => {
                    return ReconcileOutcome::failed(
                        e.to_string(),
                        self.config.not_available_interval,
                    );
                }
                Err(e) => return self.fail(object, e).await,
            };

            if let Err(e) = self.terminator.terminate(&client, &object).await {
                return self.fail(object, ReconcileError::Terminate(e)).await;
            }
        }

        object.clear_finalizer();
        if let Err(e) = self.store.persist(&object).await {
            return ReconcileOutcome::failed(e.to_string(), self.config.base_backoff);
        }
        info!(object = %object.key(), "terminated");
        ReconcileOutcome::done()
    }

    /// Record the failure on the object and compute the backoff delay.
    async fn fail(&self, mut object: DeclaredObject<S>, error: ReconcileError) -> ReconcileOutcome {
        let text = error.to_string();
        warn!(object = %object.key(), error = %text, "pass failed");

        object.set_failure_status(&text);
        let delay = self.backoff(object.status.failure_count);

        if let Err(e) = self.store.persist(&object).await {
            warn!(object = %object.key(), error = %e, "failed to persist status");
        }

        ReconcileOutcome::failed(text, delay)
    }

    /// Linear backoff in the failure count, capped, and therefore
    /// monotonically non-decreasing across consecutive failures.
    fn backoff(&self, failure_count: u32) -> Duration {
        let scaled = self
            .config
            .base_backoff
            .saturating_mul(failure_count.max(1));
        scaled.min(self.config.max_backoff)
    }
}
