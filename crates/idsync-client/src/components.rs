//! Realm component operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::RemoteClient;
use crate::error::{RemoteError, RemoteResult};

/// Remote component representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub provider_id: String,
    pub provider_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub config: BTreeMap<String, Vec<String>>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl RemoteClient {
    /// List components, optionally filtered by name.
    pub async fn get_components(
        &self,
        realm: &str,
        name: Option<&str>,
    ) -> RemoteResult<Vec<ComponentRepresentation>> {
        let query: Vec<(&str, String)> = match name {
            Some(n) => vec![("name", n.to_string())],
            None => vec![],
        };
        self.get_json(&self.admin_url(&format!("/{realm}/components")), &query)
            .await
    }

    /// Fetch a component by exact name. Absence surfaces as `NotFound`.
    pub async fn get_component_by_name(
        &self,
        realm: &str,
        name: &str,
    ) -> RemoteResult<ComponentRepresentation> {
        let components = self.get_components(realm, Some(name)).await?;

        components
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| RemoteError::NotFound(format!("component {name} not found")))
    }

    pub async fn create_component(
        &self,
        realm: &str,
        rep: &ComponentRepresentation,
    ) -> RemoteResult<Option<String>> {
        self.post_created(&self.admin_url(&format!("/{realm}/components")), rep)
            .await
    }

    pub async fn update_component(
        &self,
        realm: &str,
        component_id: &str,
        rep: &ComponentRepresentation,
    ) -> RemoteResult<()> {
        self.put_unit(
            &self.admin_url(&format!("/{realm}/components/{component_id}")),
            rep,
        )
        .await
    }

    pub async fn delete_component(&self, realm: &str, component_id: &str) -> RemoteResult<()> {
        self.delete_unit(&self.admin_url(&format!("/{realm}/components/{component_id}")))
            .await
    }
}
