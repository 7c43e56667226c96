//! Identity-provider and IdP-mapper operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::RemoteClient;
use crate::error::RemoteResult;

/// Remote identity-provider representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProviderRepresentation {
    pub alias: String,
    pub provider_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_broker_login_flow_alias: Option<String>,
    #[serde(default)]
    pub trust_email: bool,
    #[serde(default)]
    pub store_token: bool,
    #[serde(default)]
    pub link_only: bool,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Remote IdP-mapper representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdpMapperRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub identity_provider_alias: String,
    pub identity_provider_mapper: String,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl RemoteClient {
    /// Fetch an identity provider by alias. Absence surfaces as `NotFound`.
    pub async fn get_identity_provider(
        &self,
        realm: &str,
        alias: &str,
    ) -> RemoteResult<IdentityProviderRepresentation> {
        self.get_json(
            &self.admin_url(&format!("/{realm}/identity-provider/instances/{alias}")),
            &[],
        )
        .await
    }

    pub async fn create_identity_provider(
        &self,
        realm: &str,
        rep: &IdentityProviderRepresentation,
    ) -> RemoteResult<()> {
        self.post_unit(
            &self.admin_url(&format!("/{realm}/identity-provider/instances")),
            rep,
        )
        .await
    }

    pub async fn update_identity_provider(
        &self,
        realm: &str,
        rep: &IdentityProviderRepresentation,
    ) -> RemoteResult<()> {
        self.put_unit(
            &self.admin_url(&format!(
                "/{realm}/identity-provider/instances/{}",
                rep.alias
            )),
            rep,
        )
        .await
    }

    pub async fn delete_identity_provider(&self, realm: &str, alias: &str) -> RemoteResult<()> {
        self.delete_unit(&self.admin_url(&format!("/{realm}/identity-provider/instances/{alias}")))
            .await
    }

    pub async fn get_idp_mappers(
        &self,
        realm: &str,
        alias: &str,
    ) -> RemoteResult<Vec<IdpMapperRepresentation>> {
        self.get_json(
            &self.admin_url(&format!(
                "/{realm}/identity-provider/instances/{alias}/mappers"
            )),
            &[],
        )
        .await
    }

    pub async fn create_idp_mapper(
        &self,
        realm: &str,
        alias: &str,
        rep: &IdpMapperRepresentation,
    ) -> RemoteResult<Option<String>> {
        self.post_created(
            &self.admin_url(&format!(
                "/{realm}/identity-provider/instances/{alias}/mappers"
            )),
            rep,
        )
        .await
    }

    pub async fn delete_idp_mapper(
        &self,
        realm: &str,
        alias: &str,
        mapper_id: &str,
    ) -> RemoteResult<()> {
        self.delete_unit(&self.admin_url(&format!(
            "/{realm}/identity-provider/instances/{alias}/mappers/{mapper_id}"
        )))
        .await
    }
}
