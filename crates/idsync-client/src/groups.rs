//! Group operations: CRUD, child-group membership, and the group
//! role-mapping batch endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::RemoteClient;
use crate::error::{RemoteError, RemoteResult};
use crate::roles::{MappingsRepresentation, RoleRepresentation};

/// Remote group representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_groups: Vec<GroupRepresentation>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

fn find_by_name<'a>(
    groups: &'a [GroupRepresentation],
    name: &str,
) -> Option<&'a GroupRepresentation> {
    for group in groups {
        if group.name == name {
            return Some(group);
        }
        if let Some(found) = find_by_name(&group.sub_groups, name) {
            return Some(found);
        }
    }
    None
}

impl RemoteClient {
    /// Find a group by exact name, searching the group tree. Absence
    /// surfaces as `NotFound`.
    pub async fn get_group_by_name(
        &self,
        realm: &str,
        name: &str,
    ) -> RemoteResult<GroupRepresentation> {
        let groups: Vec<GroupRepresentation> = self
            .get_json(
                &self.admin_url(&format!("/{realm}/groups")),
                &[("search", name.to_string())],
            )
            .await?;

        find_by_name(&groups, name)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("group {name} not found")))
    }

    pub async fn create_group(
        &self,
        realm: &str,
        rep: &GroupRepresentation,
    ) -> RemoteResult<Option<String>> {
        self.post_created(&self.admin_url(&format!("/{realm}/groups")), rep)
            .await
    }

    pub async fn update_group(
        &self,
        realm: &str,
        group_id: &str,
        rep: &GroupRepresentation,
    ) -> RemoteResult<()> {
        self.put_unit(&self.admin_url(&format!("/{realm}/groups/{group_id}")), rep)
            .await
    }

    pub async fn delete_group(&self, realm: &str, group_id: &str) -> RemoteResult<()> {
        self.delete_unit(&self.admin_url(&format!("/{realm}/groups/{group_id}")))
            .await
    }

    /// Direct children of a group.
    pub async fn get_child_groups(
        &self,
        realm: &str,
        group_id: &str,
    ) -> RemoteResult<Vec<GroupRepresentation>> {
        self.get_json(
            &self.admin_url(&format!("/{realm}/groups/{group_id}/children")),
            &[],
        )
        .await
    }

    /// Attach an existing group as a child of `parent_id`.
    pub async fn create_child_group(
        &self,
        realm: &str,
        parent_id: &str,
        rep: &GroupRepresentation,
    ) -> RemoteResult<()> {
        self.post_unit(
            &self.admin_url(&format!("/{realm}/groups/{parent_id}/children")),
            rep,
        )
        .await
    }

    /// Re-create a subgroup at top level, which detaches it from its
    /// parent. This is the remote API's documented detach idiom.
    pub async fn detach_group(&self, realm: &str, rep: &GroupRepresentation) -> RemoteResult<()> {
        self.post_unit(&self.admin_url(&format!("/{realm}/groups")), rep)
            .await
    }

    pub async fn get_group_role_mappings(
        &self,
        realm: &str,
        group_id: &str,
    ) -> RemoteResult<MappingsRepresentation> {
        self.get_json(
            &self.admin_url(&format!("/{realm}/groups/{group_id}/role-mappings")),
            &[],
        )
        .await
    }

    /// Batch-assign realm roles to a group in one call.
    pub async fn add_group_realm_roles(
        &self,
        realm: &str,
        group_id: &str,
        roles: &[RoleRepresentation],
    ) -> RemoteResult<()> {
        self.post_unit(
            &self.admin_url(&format!("/{realm}/groups/{group_id}/role-mappings/realm")),
            roles,
        )
        .await
    }

    /// Batch-unassign realm roles from a group in one call.
    pub async fn delete_group_realm_roles(
        &self,
        realm: &str,
        group_id: &str,
        roles: &[RoleRepresentation],
    ) -> RemoteResult<()> {
        self.delete_with_body(
            &self.admin_url(&format!("/{realm}/groups/{group_id}/role-mappings/realm")),
            roles,
        )
        .await
    }

    /// Batch-assign one owning client's roles to a group.
    pub async fn add_group_client_roles(
        &self,
        realm: &str,
        group_id: &str,
        client_entity_id: &str,
        roles: &[RoleRepresentation],
    ) -> RemoteResult<()> {
        self.post_unit(
            &self.admin_url(&format!(
                "/{realm}/groups/{group_id}/role-mappings/clients/{client_entity_id}"
            )),
            roles,
        )
        .await
    }

    /// Batch-unassign one owning client's roles from a group.
    pub async fn delete_group_client_roles(
        &self,
        realm: &str,
        group_id: &str,
        client_entity_id: &str,
        roles: &[RoleRepresentation],
    ) -> RemoteResult<()> {
        self.delete_with_body(
            &self.admin_url(&format!(
                "/{realm}/groups/{group_id}/role-mappings/clients/{client_entity_id}"
            )),
            roles,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, children: Vec<GroupRepresentation>) -> GroupRepresentation {
        GroupRepresentation {
            name: name.into(),
            sub_groups: children,
            ..GroupRepresentation::default()
        }
    }

    #[test]
    fn find_by_name_searches_subtrees() {
        let tree = vec![group("a", vec![group("b", vec![group("c", vec![])])])];
        assert!(find_by_name(&tree, "c").is_some());
        assert!(find_by_name(&tree, "a").is_some());
        assert!(find_by_name(&tree, "missing").is_none());
    }

    #[test]
    fn find_by_name_is_case_sensitive() {
        let tree = vec![group("Developers", vec![])];
        assert!(find_by_name(&tree, "developers").is_none());
    }
}
