//! Group synchronization: base put, realm-role and client-role mappings,
//! and child-group membership.

use async_trait::async_trait;
use idsync_client::groups::GroupRepresentation;
use idsync_client::roles::RoleRepresentation;
use idsync_client::RemoteClient;
use idsync_core::kinds::group::GroupSpec;
use tracing::debug;

use crate::diff::{reconcile_named_set, NamedSetOps};
use crate::error::{RemoteResultExt, SyncError, SyncResult};

struct GroupRealmRoleOps<'a> {
    client: &'a RemoteClient,
    realm: &'a str,
    group_id: &'a str,
}

#[async_trait]
impl NamedSetOps for GroupRealmRoleOps<'_> {
    type Item = RoleRepresentation;

    fn item_name(item: &RoleRepresentation) -> &str {
        &item.name
    }

    async fn resolve(&self, name: &str) -> SyncResult<RoleRepresentation> {
        self.client
            .get_realm_role(self.realm, name)
            .await
            .context(|| format!("resolving realm role {name} in realm {}", self.realm))
    }

    async fn add(&self, items: &[RoleRepresentation]) -> SyncResult<()> {
        self.client
            .add_group_realm_roles(self.realm, self.group_id, items)
            .await
            .context(|| format!("assigning realm roles to group {}", self.group_id))
    }

    async fn remove(&self, items: &[RoleRepresentation]) -> SyncResult<()> {
        self.client
            .delete_group_realm_roles(self.realm, self.group_id, items)
            .await
            .context(|| format!("unassigning realm roles from group {}", self.group_id))
    }
}

struct GroupClientRoleOps<'a> {
    client: &'a RemoteClient,
    realm: &'a str,
    group_id: &'a str,
    client_entity_id: &'a str,
}

#[async_trait]
impl NamedSetOps for GroupClientRoleOps<'_> {
    type Item = RoleRepresentation;

    fn item_name(item: &RoleRepresentation) -> &str {
        &item.name
    }

    async fn resolve(&self, name: &str) -> SyncResult<RoleRepresentation> {
        self.client
            .get_client_role(self.realm, self.client_entity_id, name)
            .await
            .context(|| format!("resolving client role {name} in realm {}", self.realm))
    }

    async fn add(&self, items: &[RoleRepresentation]) -> SyncResult<()> {
        self.client
            .add_group_client_roles(self.realm, self.group_id, self.client_entity_id, items)
            .await
            .context(|| format!("assigning client roles to group {}", self.group_id))
    }

    async fn remove(&self, items: &[RoleRepresentation]) -> SyncResult<()> {
        self.client
            .delete_group_client_roles(self.realm, self.group_id, self.client_entity_id, items)
            .await
            .context(|| format!("unassigning client roles from group {}", self.group_id))
    }
}

/// Child-group membership. The remote API attaches and detaches one group
/// at a time; detaching re-creates the child as a top-level group.
struct SubGroupOps<'a> {
    client: &'a RemoteClient,
    realm: &'a str,
    parent_id: &'a str,
}

#[async_trait]
impl NamedSetOps for SubGroupOps<'_> {
    type Item = GroupRepresentation;

    fn item_name(item: &GroupRepresentation) -> &str {
        &item.name
    }

    async fn resolve(&self, name: &str) -> SyncResult<GroupRepresentation> {
        self.client
            .get_group_by_name(self.realm, name)
            .await
            .context(|| format!("resolving subgroup {name} in realm {}", self.realm))
    }

    async fn add(&self, items: &[GroupRepresentation]) -> SyncResult<()> {
        for item in items {
            self.client
                .create_child_group(self.realm, self.parent_id, item)
                .await
                .context(|| format!("attaching subgroup {} to {}", item.name, self.parent_id))?;
        }
        Ok(())
    }

    async fn remove(&self, items: &[GroupRepresentation]) -> SyncResult<()> {
        for item in items {
            self.client
                .detach_group(self.realm, item)
                .await
                .context(|| format!("detaching subgroup {} from {}", item.name, self.parent_id))?;
        }
        Ok(())
    }
}

/// Converge one realm group. Returns the group's remote id.
pub async fn sync_group(client: &RemoteClient, spec: &GroupSpec) -> SyncResult<Option<String>> {
    let realm = &spec.realm;
    let name = &spec.name;

    let group_id = match client.get_group_by_name(realm, name).await {
        Ok(mut current) => {
            let id = current.id.clone().ok_or_else(|| {
                SyncError::remote(
                    format!("group {name} in realm {realm}"),
                    idsync_client::RemoteError::Parse("group without id".into()),
                )
            })?;
            if !spec.attributes.is_empty() {
                current.attributes = Some(spec.attributes.clone());
                client
                    .update_group(realm, &id, &current)
                    .await
                    .context(|| format!("updating group {name} in realm {realm}"))?;
            }
            id
        }
        Err(e) if e.is_not_found() => {
            debug!(realm = %realm, group = %name, "creating group");
            let rep = GroupRepresentation {
                name: name.clone(),
                path: spec.path.clone(),
                attributes: (!spec.attributes.is_empty()).then(|| spec.attributes.clone()),
                ..GroupRepresentation::default()
            };
            match client
                .create_group(realm, &rep)
                .await
                .context(|| format!("creating group {name} in realm {realm}"))?
            {
                Some(id) => id,
                None => {
                    let created = client
                        .get_group_by_name(realm, name)
                        .await
                        .context(|| format!("fetching created group {name}"))?;
                    created.id.ok_or_else(|| {
                        SyncError::remote(
                            format!("group {name} in realm {realm}"),
                            idsync_client::RemoteError::Parse("group without id".into()),
                        )
                    })?
                }
            }
        }
        Err(e) => {
            return Err(SyncError::remote(
                format!("fetching group {name} in realm {realm}"),
                e,
            ))
        }
    };

    sync_group_roles(client, spec, &group_id).await?;
    sync_sub_groups(client, spec, &group_id).await?;

    Ok(Some(group_id))
}

/// Reconcile the group's realm-role and client-role mappings.
async fn sync_group_roles(
    client: &RemoteClient,
    spec: &GroupSpec,
    group_id: &str,
) -> SyncResult<()> {
    let realm = &spec.realm;

    let mappings = client
        .get_group_role_mappings(realm, group_id)
        .await
        .context(|| format!("fetching role mappings of group {group_id}"))?;

    let realm_ops = GroupRealmRoleOps {
        client,
        realm,
        group_id,
    };
    reconcile_named_set(
        &realm_ops,
        &spec.realm_roles,
        mappings.realm_mappings.unwrap_or_default(),
    )
    .await?;

    let current_clients = mappings.client_mappings.unwrap_or_default();

    // One pass per claimed owning client.
    for claim in &spec.client_roles {
        let entity_id = client
            .get_client_entity_id(realm, &claim.client_id)
            .await
            .context(|| format!("resolving owning client {} in realm {realm}", claim.client_id))?;

        let current = current_clients
            .get(&claim.client_id)
            .and_then(|m| m.mappings.clone())
            .unwrap_or_default();

        let ops = GroupClientRoleOps {
            client,
            realm,
            group_id,
            client_entity_id: &entity_id,
        };
        reconcile_named_set(&ops, &claim.roles, current).await?;
    }

    // Owning clients mapped on the remote side but absent from the claim
    // lose all of their mappings.
    for (client_name, mapping) in &current_clients {
        if spec.client_roles.iter().any(|c| &c.client_id == client_name) {
            continue;
        }
        let Some(roles) = &mapping.mappings else {
            continue;
        };
        if roles.is_empty() {
            continue;
        }
        let entity_id = match &mapping.id {
            Some(id) => id.clone(),
            None => client
                .get_client_entity_id(realm, client_name)
                .await
                .context(|| format!("resolving owning client {client_name} in realm {realm}"))?,
        };
        client
            .delete_group_client_roles(realm, group_id, &entity_id, roles)
            .await
            .context(|| format!("removing stale client-role mappings of {client_name}"))?;
    }

    Ok(())
}

/// Reconcile the group's direct children against the claimed list.
async fn sync_sub_groups(client: &RemoteClient, spec: &GroupSpec, group_id: &str) -> SyncResult<()> {
    let realm = &spec.realm;

    let children = client
        .get_child_groups(realm, group_id)
        .await
        .context(|| format!("fetching children of group {group_id}"))?;

    let ops = SubGroupOps {
        client,
        realm,
        parent_id: group_id,
    };
    reconcile_named_set(&ops, &spec.sub_groups, children).await?;
    Ok(())
}

/// Delete the remote group. Absence is success.
pub async fn remove_group(client: &RemoteClient, spec: &GroupSpec) -> SyncResult<()> {
    let realm = &spec.realm;
    let name = &spec.name;

    let current = match client.get_group_by_name(realm, name).await {
        Ok(current) => current,
        Err(e) if e.is_not_found() => return Ok(()),
        Err(e) => {
            return Err(SyncError::remote(
                format!("fetching group {name} in realm {realm}"),
                e,
            ))
        }
    };
    let Some(id) = current.id else {
        return Ok(());
    };

    match client.delete_group(realm, &id).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(SyncError::remote(
            format!("deleting group {name} in realm {realm}"),
            e,
        )),
    }
}
