//! Realm group spec: group attributes plus claimed role and subgroup sets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::object::ResourceSpec;

/// Claimed client roles for one owning client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRoleClaim {
    pub client_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Desired state of one realm group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    pub realm: String,

    /// Group name, unique within the realm.
    pub name: String,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,

    /// Claimed realm-role assignments, by role name.
    #[serde(default)]
    pub realm_roles: Vec<String>,

    /// Claimed client-role assignments, grouped by owning client.
    #[serde(default)]
    pub client_roles: Vec<ClientRoleClaim>,

    /// Claimed child groups, by group name. Each must already exist as a
    /// group in the realm; membership is reconciled, not group creation.
    #[serde(default)]
    pub sub_groups: Vec<String>,
}

impl ResourceSpec for GroupSpec {
    const KIND: &'static str = "RealmGroup";

    fn key_name(&self) -> &str {
        &self.name
    }
}
