//! Client scope spec and its protocol-mapper claims.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::object::ResourceSpec;

/// How the scope is assigned to new clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeType {
    Default,
    Optional,
    #[default]
    None,
}

/// One claimed protocol mapper, keyed by name within its scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolMapperClaim {
    pub name: String,
    #[serde(default)]
    pub protocol: String,
    /// Mapper implementation id, e.g. `"oidc-usermodel-attribute-mapper"`.
    pub protocol_mapper: String,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

/// Desired state of one client scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientScopeSpec {
    pub realm: String,

    /// Scope name, unique within the realm.
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Protocol the scope applies to, usually `"openid-connect"`.
    #[serde(default)]
    pub protocol: String,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    #[serde(default)]
    pub scope_type: ScopeType,

    /// Claimed protocol mappers, reconciled by name against the scope's
    /// current mappers.
    #[serde(default)]
    pub protocol_mappers: Vec<ProtocolMapperClaim>,
}

impl ResourceSpec for ClientScopeSpec {
    const KIND: &'static str = "ClientScope";

    fn key_name(&self) -> &str {
        &self.name
    }
}
