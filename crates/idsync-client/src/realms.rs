//! Realm operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::RemoteClient;
use crate::error::RemoteResult;

/// Remote realm representation.
///
/// Only the fields the engine manages are modeled; everything else the
/// remote side returns is round-tripped through `other` so a merge-update
/// never clobbers remote-managed settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub realm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontend_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_allowed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remember_me: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smtp_server: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl RemoteClient {
    /// Fetch a realm by name. Absence surfaces as `NotFound`.
    pub async fn get_realm(&self, realm: &str) -> RemoteResult<RealmRepresentation> {
        self.get_json(&self.admin_url(&format!("/{realm}")), &[])
            .await
    }

    pub async fn create_realm(&self, rep: &RealmRepresentation) -> RemoteResult<()> {
        let url = format!("{}/admin/realms", self.base_url());
        self.post_unit(&url, rep).await
    }

    pub async fn update_realm(&self, rep: &RealmRepresentation) -> RemoteResult<()> {
        self.put_unit(&self.admin_url(&format!("/{}", rep.realm)), rep)
            .await
    }

    pub async fn delete_realm(&self, realm: &str) -> RemoteResult<()> {
        self.delete_unit(&self.admin_url(&format!("/{realm}")))
            .await
    }
}
