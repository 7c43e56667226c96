//! OIDC client spec.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::object::ResourceSpec;

/// Service-account configuration for a confidential client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountClaim {
    /// Claimed realm roles for the client's service-account user.
    #[serde(default)]
    pub realm_roles: Vec<String>,
}

/// Desired state of one client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSpec {
    pub realm: String,

    /// Client id, unique within the realm. Distinct from the
    /// system-assigned entity id.
    pub client_id: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub enabled: Option<bool>,

    #[serde(default)]
    pub public_client: bool,

    #[serde(default)]
    pub standard_flow_enabled: Option<bool>,

    #[serde(default)]
    pub direct_access_grants_enabled: Option<bool>,

    #[serde(default)]
    pub redirect_uris: Vec<String>,

    #[serde(default)]
    pub web_origins: Vec<String>,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Present when the client authenticates as a service account whose
    /// role assignments should be reconciled.
    #[serde(default)]
    pub service_account: Option<ServiceAccountClaim>,
}

impl ResourceSpec for ClientSpec {
    const KIND: &'static str = "Client";

    fn key_name(&self) -> &str {
        &self.client_id
    }
}
