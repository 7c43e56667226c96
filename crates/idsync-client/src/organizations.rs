//! Organization operations and the single-item IdP link endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::RemoteClient;
use crate::error::{RemoteError, RemoteResult};

/// One organization domain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDomain {
    pub name: String,
    #[serde(default)]
    pub verified: bool,
}

/// Remote organization representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub alias: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<OrganizationDomain>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// An identity provider as listed under an organization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationIdpLink {
    pub alias: String,
    #[serde(default)]
    pub provider_id: Option<String>,
}

impl RemoteClient {
    /// List organizations, optionally filtered by alias.
    pub async fn get_organizations(
        &self,
        realm: &str,
        alias: Option<&str>,
    ) -> RemoteResult<Vec<OrganizationRepresentation>> {
        let query: Vec<(&str, String)> = match alias {
            Some(a) => vec![("q", format!("alias:{a}"))],
            None => vec![],
        };
        self.get_json(&self.admin_url(&format!("/{realm}/organizations")), &query)
            .await
    }

    /// Fetch an organization by exact alias. Absence surfaces as
    /// `NotFound`.
    pub async fn get_organization_by_alias(
        &self,
        realm: &str,
        alias: &str,
    ) -> RemoteResult<OrganizationRepresentation> {
        let orgs = self.get_organizations(realm, Some(alias)).await?;

        orgs.into_iter()
            .find(|o| o.alias == alias)
            .ok_or_else(|| RemoteError::NotFound(format!("organization {alias} not found")))
    }

    pub async fn create_organization(
        &self,
        realm: &str,
        rep: &OrganizationRepresentation,
    ) -> RemoteResult<Option<String>> {
        self.post_created(&self.admin_url(&format!("/{realm}/organizations")), rep)
            .await
    }

    pub async fn update_organization(
        &self,
        realm: &str,
        org_id: &str,
        rep: &OrganizationRepresentation,
    ) -> RemoteResult<()> {
        self.put_unit(
            &self.admin_url(&format!("/{realm}/organizations/{org_id}")),
            rep,
        )
        .await
    }

    pub async fn delete_organization(&self, realm: &str, org_id: &str) -> RemoteResult<()> {
        self.delete_unit(&self.admin_url(&format!("/{realm}/organizations/{org_id}")))
            .await
    }

    pub async fn get_organization_idps(
        &self,
        realm: &str,
        org_id: &str,
    ) -> RemoteResult<Vec<OrganizationIdpLink>> {
        self.get_json(
            &self.admin_url(&format!("/{realm}/organizations/{org_id}/identity-providers")),
            &[],
        )
        .await
    }

    /// Link one identity provider to an organization. The remote API has
    /// no batch variant of this call.
    pub async fn link_organization_idp(
        &self,
        realm: &str,
        org_id: &str,
        idp_alias: &str,
    ) -> RemoteResult<()> {
        self.post_unit(
            &self.admin_url(&format!("/{realm}/organizations/{org_id}/identity-providers")),
            idp_alias,
        )
        .await
    }

    /// Unlink one identity provider from an organization.
    pub async fn unlink_organization_idp(
        &self,
        realm: &str,
        org_id: &str,
        idp_alias: &str,
    ) -> RemoteResult<()> {
        self.delete_unit(&self.admin_url(&format!(
            "/{realm}/organizations/{org_id}/identity-providers/{idp_alias}"
        )))
        .await
    }
}
