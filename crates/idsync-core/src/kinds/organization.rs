//! Organization spec.

use serde::{Deserialize, Serialize};

use crate::object::ResourceSpec;

/// Desired state of one organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSpec {
    pub realm: String,

    /// Organization alias, unique within the realm.
    pub alias: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub domains: Vec<String>,

    /// Aliases of identity providers linked to the organization. Links are
    /// reconciled one at a time; the remote API has no batch endpoint for
    /// this relation.
    #[serde(default)]
    pub identity_providers: Vec<String>,
}

impl ResourceSpec for OrganizationSpec {
    const KIND: &'static str = "Organization";

    fn key_name(&self) -> &str {
        &self.alias
    }
}
