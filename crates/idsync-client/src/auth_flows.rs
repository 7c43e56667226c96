//! Authentication-flow operations, execution creation, and execution
//! config.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::RemoteClient;
use crate::error::{RemoteError, RemoteResult};

/// Remote authentication-flow representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthFlowRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub provider_id: String,
    #[serde(default)]
    pub top_level: bool,
    #[serde(default)]
    pub built_in: bool,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Payload for creating a single execution directly under a flow.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionCreatePayload {
    pub authenticator: String,
    pub requirement: String,
    pub priority: i32,
    pub parent_flow: String,
    pub authenticator_flow: bool,
}

/// Authenticator-config payload attached to one execution.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorConfigRepresentation {
    pub alias: String,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl RemoteClient {
    pub async fn get_auth_flows(&self, realm: &str) -> RemoteResult<Vec<AuthFlowRepresentation>> {
        self.get_json(
            &self.admin_url(&format!("/{realm}/authentication/flows")),
            &[],
        )
        .await
    }

    /// Fetch a flow by exact alias. Absence surfaces as `NotFound`.
    pub async fn get_auth_flow_by_alias(
        &self,
        realm: &str,
        alias: &str,
    ) -> RemoteResult<AuthFlowRepresentation> {
        let flows = self.get_auth_flows(realm).await?;

        flows
            .into_iter()
            .find(|f| f.alias == alias)
            .ok_or_else(|| RemoteError::NotFound(format!("auth flow {alias} not found")))
    }

    pub async fn create_auth_flow(
        &self,
        realm: &str,
        rep: &AuthFlowRepresentation,
    ) -> RemoteResult<Option<String>> {
        self.post_created(
            &self.admin_url(&format!("/{realm}/authentication/flows")),
            rep,
        )
        .await
    }

    /// Delete a flow by its system-assigned id, not its alias.
    pub async fn delete_auth_flow(&self, realm: &str, flow_id: &str) -> RemoteResult<()> {
        self.delete_unit(&self.admin_url(&format!("/{realm}/authentication/flows/{flow_id}")))
            .await
    }

    /// Create one execution. The created execution's id comes back in the
    /// Location header.
    pub async fn add_flow_execution(
        &self,
        realm: &str,
        payload: &ExecutionCreatePayload,
    ) -> RemoteResult<Option<String>> {
        self.post_created(
            &self.admin_url(&format!("/{realm}/authentication/executions")),
            payload,
        )
        .await
    }

    /// Attach an authenticator config to one execution.
    pub async fn create_execution_config(
        &self,
        realm: &str,
        execution_id: &str,
        config: &AuthenticatorConfigRepresentation,
    ) -> RemoteResult<()> {
        self.post_unit(
            &self.admin_url(&format!(
                "/{realm}/authentication/executions/{execution_id}/config"
            )),
            config,
        )
        .await
    }
}
