//! Identity provider spec and its mapper claims.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::object::ResourceSpec;

/// One claimed identity-provider mapper. Mappers are replaced wholesale on
/// every pass; keyed identity across partial updates is unreliable, so no
/// incremental diff is attempted for them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdpMapperClaim {
    pub name: String,
    /// Mapper implementation id, e.g. `"oidc-user-attribute-idp-mapper"`.
    pub identity_provider_mapper: String,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

/// Desired state of one identity provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProviderSpec {
    pub realm: String,

    /// Provider alias, unique within the realm.
    pub alias: String,

    /// Provider implementation id, e.g. `"oidc"` or `"saml"`.
    pub provider_id: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub enabled: Option<bool>,

    #[serde(default)]
    pub first_broker_login_flow_alias: Option<String>,

    #[serde(default)]
    pub trust_email: bool,

    #[serde(default)]
    pub store_token: bool,

    #[serde(default)]
    pub link_only: bool,

    #[serde(default)]
    pub config: BTreeMap<String, String>,

    #[serde(default)]
    pub mappers: Vec<IdpMapperClaim>,
}

impl ResourceSpec for IdentityProviderSpec {
    const KIND: &'static str = "IdentityProvider";

    fn key_name(&self) -> &str {
        &self.alias
    }
}
