//! Realm component spec (user federation providers, key providers, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::object::ResourceSpec;

/// Desired state of one realm component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    pub realm: String,

    /// Component name, unique within the realm for its provider type.
    pub name: String,

    /// Provider implementation id, e.g. `"ldap"`.
    pub provider_id: String,

    /// Fully qualified provider interface the component implements, as the
    /// remote service names it.
    pub provider_type: String,

    #[serde(default)]
    pub config: BTreeMap<String, Vec<String>>,
}

impl ResourceSpec for ComponentSpec {
    const KIND: &'static str = "RealmComponent";

    fn key_name(&self) -> &str {
        &self.name
    }
}
