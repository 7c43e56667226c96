//! Authentication flow spec.
//!
//! Flows are replaced wholesale: execution ordering and step ids are not
//! independently addressable on the remote side, so the synchronizer
//! deletes an existing flow with the same alias and recreates it, adding
//! executions in ascending priority order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::object::ResourceSpec;

/// Authenticator config attached to one execution. Creating it costs one
/// extra remote call keyed by the just-created execution's id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorConfigClaim {
    pub alias: String,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

/// One execution step inside a flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionClaim {
    /// Authenticator implementation id, e.g. `"auth-username-password-form"`.
    pub authenticator: String,

    /// `"REQUIRED"`, `"ALTERNATIVE"`, `"CONDITIONAL"` or `"DISABLED"`.
    pub requirement: String,

    /// Creation order; executions are created ascending by priority.
    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub authenticator_config: Option<AuthenticatorConfigClaim>,
}

/// Desired state of one authentication flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthFlowSpec {
    pub realm: String,

    /// Flow alias, unique within the realm.
    pub alias: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Flow provider id, usually `"basic-flow"`.
    #[serde(default)]
    pub provider_id: String,

    #[serde(default)]
    pub executions: Vec<ExecutionClaim>,

    /// Bind this flow as the realm's browser flow after sync.
    #[serde(default)]
    pub realm_browser_flow: bool,
}

impl ResourceSpec for AuthFlowSpec {
    const KIND: &'static str = "AuthFlow";

    fn key_name(&self) -> &str {
        &self.alias
    }
}
