//! The declared-object envelope shared by every resource kind.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Status value reported after a pass that completed without error.
pub const STATUS_OK: &str = "OK";

/// Marker trait for kind-specific spec types.
///
/// `KIND` is the stable kind discriminator used in object keys and log
/// output; `key_name` is the remote-side name or alias the spec claims.
pub trait ResourceSpec: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Stable kind name, e.g. `"Realm"` or `"RealmGroup"`.
    const KIND: &'static str;

    /// The remote-side name or alias this spec converges toward.
    fn key_name(&self) -> &str;
}

/// Key identifying one declared object in the spec store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    pub kind: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// Observable reconciliation status of one declared object.
///
/// These three fields are the entire health contract surfaced to external
/// tooling: `value` is `"OK"` or the most recent error text, `failure_count`
/// drives backoff and escalation, `entity_id` records the system-assigned
/// remote identifier once known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStatus {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub failure_count: u32,
    #[serde(default)]
    pub entity_id: Option<String>,
}

impl ObjectStatus {
    /// Whether the most recent pass completed without error.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.value == STATUS_OK
    }
}

/// One declared object: the desired-state record driving a single
/// reconciliation target.
///
/// The spec store owns the object; only the reconcile loop mutates its
/// status, and only the deletion terminator path clears the finalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclaredObject<S> {
    /// Object name, unique per kind within the store.
    pub name: String,

    /// Name of the connection object holding endpoint and credentials for
    /// the remote service this object converges against.
    pub connection: String,

    /// Kind-specific desired state.
    pub spec: S,

    #[serde(default)]
    pub status: ObjectStatus,

    /// Set by the spec store once deletion has been requested. The object
    /// is purged only after the finalizer is cleared.
    #[serde(default)]
    pub deletion_requested: bool,

    #[serde(default)]
    pub finalizer: Option<String>,

    /// Escape hatch: skip remote-side cleanup on deletion.
    #[serde(default)]
    pub preserve_on_deletion: bool,
}

impl<S: ResourceSpec> DeclaredObject<S> {
    pub fn new(name: impl Into<String>, connection: impl Into<String>, spec: S) -> Self {
        Self {
            name: name.into(),
            connection: connection.into(),
            spec,
            status: ObjectStatus::default(),
            deletion_requested: false,
            finalizer: None,
            preserve_on_deletion: false,
        }
    }

    #[must_use]
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(S::KIND, self.name.clone())
    }

    /// Record a successful pass: status OK, failure counter reset.
    pub fn set_success_status(&mut self) {
        self.status.value = STATUS_OK.to_string();
        self.status.failure_count = 0;
    }

    /// Record a failed pass: status carries the error text and the failure
    /// counter grows, driving backoff.
    pub fn set_failure_status(&mut self, error: &str) {
        self.status.value = error.to_string();
        self.status.failure_count = self.status.failure_count.saturating_add(1);
    }

    /// Add the finalizer if absent. Returns `true` if the object changed.
    pub fn ensure_finalizer(&mut self, finalizer: &str) -> bool {
        if self.finalizer.as_deref() == Some(finalizer) {
            return false;
        }
        self.finalizer = Some(finalizer.to_string());
        true
    }

    /// Remove the finalizer. Returns `true` if the object changed.
    pub fn clear_finalizer(&mut self) -> bool {
        self.finalizer.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::group::GroupSpec;

    fn group() -> DeclaredObject<GroupSpec> {
        DeclaredObject::new(
            "developers",
            "main",
            GroupSpec {
                realm: "master".into(),
                name: "developers".into(),
                ..GroupSpec::default()
            },
        )
    }

    #[test]
    fn failure_status_increments_counter() {
        let mut obj = group();
        obj.set_failure_status("boom");
        obj.set_failure_status("boom again");
        assert_eq!(obj.status.value, "boom again");
        assert_eq!(obj.status.failure_count, 2);

        obj.set_success_status();
        assert!(obj.status.is_ok());
        assert_eq!(obj.status.failure_count, 0);
    }

    #[test]
    fn finalizer_round_trip() {
        let mut obj = group();
        assert!(obj.ensure_finalizer("idsync/group"));
        assert!(!obj.ensure_finalizer("idsync/group"));
        assert!(obj.clear_finalizer());
        assert!(!obj.clear_finalizer());
    }

    #[test]
    fn key_includes_kind() {
        let obj = group();
        assert_eq!(obj.key().to_string(), "RealmGroup/developers");
    }
}
