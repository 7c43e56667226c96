//! Spec store boundary.
//!
//! The store owns the declared objects; the reconcile loop reads one
//! object per pass and writes back status and finalizer changes. An
//! object whose deletion was requested is purged by the store once its
//! finalizer is gone.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use idsync_core::object::{DeclaredObject, ResourceSpec};

use crate::error::{ReconcileError, ReconcileResult};

/// Storage boundary for declared objects of one kind.
#[async_trait]
pub trait SpecStore<S: ResourceSpec>: Send + Sync {
    /// Load one object by name. `None` when the object does not exist
    /// (or was already purged).
    async fn get(&self, name: &str) -> ReconcileResult<Option<DeclaredObject<S>>>;

    /// Persist status and finalizer changes. The store purges the object
    /// when deletion was requested and the finalizer is cleared.
    async fn persist(&self, object: &DeclaredObject<S>) -> ReconcileResult<()>;
}

/// In-memory store used by tests and embedded setups.
pub struct InMemoryStore<S> {
    objects: Mutex<HashMap<String, DeclaredObject<S>>>,
}

impl<S: ResourceSpec> InMemoryStore<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Insert or replace an object.
    pub fn put(&self, object: DeclaredObject<S>) {
        self.objects
            .lock()
            .expect("store lock poisoned")
            .insert(object.name.clone(), object);
    }

    /// Flag an object for deletion, as the declaring side would.
    pub fn request_deletion(&self, name: &str) {
        if let Some(object) = self
            .objects
            .lock()
            .expect("store lock poisoned")
            .get_mut(name)
        {
            object.deletion_requested = true;
        }
    }

    /// Current snapshot of one object.
    pub fn snapshot(&self, name: &str) -> Option<DeclaredObject<S>> {
        self.objects
            .lock()
            .expect("store lock poisoned")
            .get(name)
            .cloned()
    }
}

impl<S: ResourceSpec> Default for InMemoryStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S: ResourceSpec> SpecStore<S> for InMemoryStore<S> {
    async fn get(&self, name: &str) -> ReconcileResult<Option<DeclaredObject<S>>> {
        Ok(self
            .objects
            .lock()
            .map_err(|_| ReconcileError::Store("store lock poisoned".into()))?
            .get(name)
            .cloned())
    }

    async fn persist(&self, object: &DeclaredObject<S>) -> ReconcileResult<()> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| ReconcileError::Store("store lock poisoned".into()))?;

        if object.deletion_requested && object.finalizer.is_none() {
            objects.remove(&object.name);
        } else {
            objects.insert(object.name.clone(), object.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idsync_core::kinds::role::RoleSpec;

    fn role_object(name: &str) -> DeclaredObject<RoleSpec> {
        DeclaredObject::new(
            name,
            "main",
            RoleSpec {
                realm: "master".into(),
                name: name.into(),
                ..RoleSpec::default()
            },
        )
    }

    #[tokio::test]
    async fn persist_purges_once_finalizer_cleared() {
        let store = InMemoryStore::new();
        let mut object = role_object("viewer");
        object.ensure_finalizer("idsync/role");
        store.put(object.clone());

        object.deletion_requested = true;
        store.persist(&object).await.unwrap();
        assert!(store.snapshot("viewer").is_some());

        object.clear_finalizer();
        store.persist(&object).await.unwrap();
        assert!(store.snapshot("viewer").is_none());
    }
}
