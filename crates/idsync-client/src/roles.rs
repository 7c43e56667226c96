//! Realm-role and role-mapping operations, including the batch
//! attach/detach endpoints the named-set sync relies on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::RemoteClient;
use crate::error::RemoteResult;

/// Remote role representation, shared by realm and client roles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub composite: bool,
    #[serde(default)]
    pub client_role: bool,
    /// Owning container: the realm id for realm roles, the client's
    /// entity id for client roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, Vec<String>>>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Role mappings of one entity (group or user): realm roles plus client
/// roles grouped by owning client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingsRepresentation {
    #[serde(default)]
    pub realm_mappings: Option<Vec<RoleRepresentation>>,
    #[serde(default)]
    pub client_mappings: Option<BTreeMap<String, ClientMappings>>,
}

/// Client-role mappings of one owning client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMappings {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub mappings: Option<Vec<RoleRepresentation>>,
}

impl RemoteClient {
    pub async fn get_realm_role(&self, realm: &str, name: &str) -> RemoteResult<RoleRepresentation> {
        self.get_json(&self.admin_url(&format!("/{realm}/roles/{name}")), &[])
            .await
    }

    pub async fn create_realm_role(
        &self,
        realm: &str,
        rep: &RoleRepresentation,
    ) -> RemoteResult<()> {
        self.post_unit(&self.admin_url(&format!("/{realm}/roles")), rep)
            .await
    }

    pub async fn update_realm_role(
        &self,
        realm: &str,
        name: &str,
        rep: &RoleRepresentation,
    ) -> RemoteResult<()> {
        self.put_unit(&self.admin_url(&format!("/{realm}/roles/{name}")), rep)
            .await
    }

    pub async fn delete_realm_role(&self, realm: &str, name: &str) -> RemoteResult<()> {
        self.delete_unit(&self.admin_url(&format!("/{realm}/roles/{name}")))
            .await
    }

    /// Roles currently associated with a composite role.
    pub async fn get_composite_roles(
        &self,
        realm: &str,
        name: &str,
    ) -> RemoteResult<Vec<RoleRepresentation>> {
        self.get_json(
            &self.admin_url(&format!("/{realm}/roles/{name}/composites")),
            &[],
        )
        .await
    }

    /// Batch-add composite associations in one call.
    pub async fn add_composite_roles(
        &self,
        realm: &str,
        name: &str,
        roles: &[RoleRepresentation],
    ) -> RemoteResult<()> {
        self.post_unit(
            &self.admin_url(&format!("/{realm}/roles/{name}/composites")),
            roles,
        )
        .await
    }

    /// Batch-remove composite associations in one call.
    pub async fn remove_composite_roles(
        &self,
        realm: &str,
        name: &str,
        roles: &[RoleRepresentation],
    ) -> RemoteResult<()> {
        self.delete_with_body(
            &self.admin_url(&format!("/{realm}/roles/{name}/composites")),
            roles,
        )
        .await
    }

    /// Fetch one role owned by a client, by the client's entity id.
    pub async fn get_client_role(
        &self,
        realm: &str,
        client_entity_id: &str,
        name: &str,
    ) -> RemoteResult<RoleRepresentation> {
        self.get_json(
            &self.admin_url(&format!("/{realm}/clients/{client_entity_id}/roles/{name}")),
            &[],
        )
        .await
    }
}
