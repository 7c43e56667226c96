//! Realm role spec, including composite membership claims.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::object::ResourceSpec;

/// Desired state of one realm role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSpec {
    /// Realm the role belongs to.
    pub realm: String,

    /// Role name, unique within the realm.
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,

    /// Whether the role is composite; when true the claimed composites
    /// below are reconciled against the role's current associations.
    #[serde(default)]
    pub composite: bool,

    /// Claimed realm-role composites, by role name.
    #[serde(default)]
    pub composites: Vec<String>,

    /// Claimed client-role composites, keyed by owning client id.
    #[serde(default)]
    pub composites_client_roles: BTreeMap<String, Vec<String>>,

    /// Whether the role is added to the realm's default-role composite.
    /// Membership there is monotonic: once present it is never removed by
    /// the sync path.
    #[serde(default)]
    pub is_default: bool,
}

impl ResourceSpec for RoleSpec {
    const KIND: &'static str = "RealmRole";

    fn key_name(&self) -> &str {
        &self.name
    }
}
