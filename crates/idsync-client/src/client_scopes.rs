//! Client-scope operations, protocol mappers, and scope-type assignment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::RemoteClient;
use crate::error::{RemoteError, RemoteResult};

/// Remote client-scope representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientScopeRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Remote protocol-mapper representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolMapperRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub protocol: String,
    pub protocol_mapper: String,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl RemoteClient {
    pub async fn get_client_scopes(
        &self,
        realm: &str,
    ) -> RemoteResult<Vec<ClientScopeRepresentation>> {
        self.get_json(&self.admin_url(&format!("/{realm}/client-scopes")), &[])
            .await
    }

    /// Fetch a client scope by exact name. Absence surfaces as `NotFound`.
    pub async fn get_client_scope_by_name(
        &self,
        realm: &str,
        name: &str,
    ) -> RemoteResult<ClientScopeRepresentation> {
        let scopes = self.get_client_scopes(realm).await?;

        scopes
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| RemoteError::NotFound(format!("client scope {name} not found")))
    }

    pub async fn create_client_scope(
        &self,
        realm: &str,
        rep: &ClientScopeRepresentation,
    ) -> RemoteResult<Option<String>> {
        self.post_created(&self.admin_url(&format!("/{realm}/client-scopes")), rep)
            .await
    }

    pub async fn update_client_scope(
        &self,
        realm: &str,
        scope_id: &str,
        rep: &ClientScopeRepresentation,
    ) -> RemoteResult<()> {
        self.put_unit(
            &self.admin_url(&format!("/{realm}/client-scopes/{scope_id}")),
            rep,
        )
        .await
    }

    pub async fn delete_client_scope(&self, realm: &str, scope_id: &str) -> RemoteResult<()> {
        self.delete_unit(&self.admin_url(&format!("/{realm}/client-scopes/{scope_id}")))
            .await
    }

    pub async fn get_protocol_mappers(
        &self,
        realm: &str,
        scope_id: &str,
    ) -> RemoteResult<Vec<ProtocolMapperRepresentation>> {
        self.get_json(
            &self.admin_url(&format!(
                "/{realm}/client-scopes/{scope_id}/protocol-mappers/models"
            )),
            &[],
        )
        .await
    }

    /// Batch-add protocol mappers to a scope in one call.
    pub async fn add_protocol_mappers(
        &self,
        realm: &str,
        scope_id: &str,
        mappers: &[ProtocolMapperRepresentation],
    ) -> RemoteResult<()> {
        self.post_unit(
            &self.admin_url(&format!(
                "/{realm}/client-scopes/{scope_id}/protocol-mappers/add-models"
            )),
            mappers,
        )
        .await
    }

    /// Remove one protocol mapper. The remote API has no batch delete for
    /// this relation.
    pub async fn delete_protocol_mapper(
        &self,
        realm: &str,
        scope_id: &str,
        mapper_id: &str,
    ) -> RemoteResult<()> {
        self.delete_unit(&self.admin_url(&format!(
            "/{realm}/client-scopes/{scope_id}/protocol-mappers/models/{mapper_id}"
        )))
        .await
    }

    /// Scopes currently assigned to the realm's default list.
    pub async fn get_default_client_scopes(
        &self,
        realm: &str,
    ) -> RemoteResult<Vec<ClientScopeRepresentation>> {
        self.get_json(
            &self.admin_url(&format!("/{realm}/default-default-client-scopes")),
            &[],
        )
        .await
    }

    /// Scopes currently assigned to the realm's optional list.
    pub async fn get_optional_client_scopes(
        &self,
        realm: &str,
    ) -> RemoteResult<Vec<ClientScopeRepresentation>> {
        self.get_json(
            &self.admin_url(&format!("/{realm}/default-optional-client-scopes")),
            &[],
        )
        .await
    }

    /// Assign a scope to the realm's default list.
    pub async fn add_default_client_scope(&self, realm: &str, scope_id: &str) -> RemoteResult<()> {
        self.put_empty(&self.admin_url(&format!(
            "/{realm}/default-default-client-scopes/{scope_id}"
        )))
        .await
    }

    /// Assign a scope to the realm's optional list.
    pub async fn add_optional_client_scope(&self, realm: &str, scope_id: &str) -> RemoteResult<()> {
        self.put_empty(&self.admin_url(&format!(
            "/{realm}/default-optional-client-scopes/{scope_id}"
        )))
        .await
    }

    /// Remove a scope from the realm's default list. Absence is swallowed:
    /// unassigning an unassigned scope is a no-op.
    pub async fn remove_default_client_scope(
        &self,
        realm: &str,
        scope_id: &str,
    ) -> RemoteResult<()> {
        match self
            .delete_unit(&self.admin_url(&format!(
                "/{realm}/default-default-client-scopes/{scope_id}"
            )))
            .await
        {
            Err(RemoteError::NotFound(_)) => Ok(()),
            other => other,
        }
    }

    /// Remove a scope from the realm's optional list, swallowing absence.
    pub async fn remove_optional_client_scope(
        &self,
        realm: &str,
        scope_id: &str,
    ) -> RemoteResult<()> {
        match self
            .delete_unit(&self.admin_url(&format!(
                "/{realm}/default-optional-client-scopes/{scope_id}"
            )))
            .await
        {
            Err(RemoteError::NotFound(_)) => Ok(()),
            other => other,
        }
    }
}
