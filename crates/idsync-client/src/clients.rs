//! Client operations, including service-account user role mappings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::RemoteClient;
use crate::error::{RemoteError, RemoteResult};
use crate::roles::{MappingsRepresentation, RoleRepresentation};

/// Remote client representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub public_client: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_flow_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_access_grants_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_accounts_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redirect_uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub web_origins: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Minimal user representation (service-account users).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl RemoteClient {
    /// Find a client by its clientId. Absence surfaces as `NotFound`.
    pub async fn get_client(
        &self,
        realm: &str,
        client_id: &str,
    ) -> RemoteResult<ClientRepresentation> {
        let clients: Vec<ClientRepresentation> = self
            .get_json(
                &self.admin_url(&format!("/{realm}/clients")),
                &[("clientId", client_id.to_string())],
            )
            .await?;

        clients
            .into_iter()
            .find(|c| c.client_id == client_id)
            .ok_or_else(|| RemoteError::NotFound(format!("client {client_id} not found")))
    }

    /// Resolve a clientId to the client's system-assigned entity id.
    pub async fn get_client_entity_id(&self, realm: &str, client_id: &str) -> RemoteResult<String> {
        let client = self.get_client(realm, client_id).await?;
        client
            .id
            .ok_or_else(|| RemoteError::Parse(format!("client {client_id} has no id")))
    }

    pub async fn create_client(
        &self,
        realm: &str,
        rep: &ClientRepresentation,
    ) -> RemoteResult<Option<String>> {
        self.post_created(&self.admin_url(&format!("/{realm}/clients")), rep)
            .await
    }

    pub async fn update_client(
        &self,
        realm: &str,
        entity_id: &str,
        rep: &ClientRepresentation,
    ) -> RemoteResult<()> {
        self.put_unit(
            &self.admin_url(&format!("/{realm}/clients/{entity_id}")),
            rep,
        )
        .await
    }

    pub async fn delete_client(&self, realm: &str, entity_id: &str) -> RemoteResult<()> {
        self.delete_unit(&self.admin_url(&format!("/{realm}/clients/{entity_id}")))
            .await
    }

    /// The user backing a client's service account.
    pub async fn get_service_account_user(
        &self,
        realm: &str,
        client_entity_id: &str,
    ) -> RemoteResult<UserRepresentation> {
        self.get_json(
            &self.admin_url(&format!(
                "/{realm}/clients/{client_entity_id}/service-account-user"
            )),
            &[],
        )
        .await
    }

    pub async fn get_user_role_mappings(
        &self,
        realm: &str,
        user_id: &str,
    ) -> RemoteResult<MappingsRepresentation> {
        self.get_json(
            &self.admin_url(&format!("/{realm}/users/{user_id}/role-mappings")),
            &[],
        )
        .await
    }

    /// Batch-assign realm roles to a user in one call.
    pub async fn add_user_realm_roles(
        &self,
        realm: &str,
        user_id: &str,
        roles: &[RoleRepresentation],
    ) -> RemoteResult<()> {
        self.post_unit(
            &self.admin_url(&format!("/{realm}/users/{user_id}/role-mappings/realm")),
            roles,
        )
        .await
    }

    /// Batch-unassign realm roles from a user in one call.
    pub async fn delete_user_realm_roles(
        &self,
        realm: &str,
        user_id: &str,
        roles: &[RoleRepresentation],
    ) -> RemoteResult<()> {
        self.delete_with_body(
            &self.admin_url(&format!("/{realm}/users/{user_id}/role-mappings/realm")),
            roles,
        )
        .await
    }
}
