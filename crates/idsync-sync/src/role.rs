//! Realm-role synchronization: base put, composite associations, and the
//! monotonic default-role membership.

use std::collections::BTreeMap;

use async_trait::async_trait;
use idsync_client::roles::RoleRepresentation;
use idsync_client::RemoteClient;
use idsync_core::kinds::role::RoleSpec;
use tracing::debug;

use crate::diff::{reconcile_named_set, NamedSetOps, SetOutcome};
use crate::error::{RemoteResultExt, SyncError, SyncResult};

/// Name of the realm's built-in default-role composite.
#[must_use]
pub fn default_role_name(realm: &str) -> String {
    format!("default-roles-{realm}")
}

/// Where a claimed composite association resolves from.
enum CompositeSource {
    Realm,
    /// Owning client's system-assigned entity id.
    Client(String),
}

/// One claimed composite association.
struct ClaimedComposite {
    name: String,
    source: CompositeSource,
}

/// Diff key of one composite association. Client roles are qualified by
/// the owning client's entity id, so a client role never settles or
/// shadows a realm-role claim of the same name.
fn composite_key(role: &RoleRepresentation) -> String {
    if role.client_role {
        match &role.container_id {
            Some(container) => format!("{container}-{}", role.name),
            None => role.name.clone(),
        }
    } else {
        role.name.clone()
    }
}

/// A composite association paired with its diff key.
struct KeyedRole {
    key: String,
    role: RoleRepresentation,
}

struct CompositeOps<'a> {
    client: &'a RemoteClient,
    realm: &'a str,
    role_name: &'a str,
    claims: BTreeMap<String, ClaimedComposite>,
}

#[async_trait]
impl NamedSetOps for CompositeOps<'_> {
    type Item = KeyedRole;

    fn item_name(item: &KeyedRole) -> &str {
        &item.key
    }

    async fn resolve(&self, key: &str) -> SyncResult<KeyedRole> {
        let realm = self.realm;
        // Additions come from the claimed set, so the key is always known.
        let claim = self
            .claims
            .get(key)
            .ok_or_else(|| SyncError::InvalidSpec(format!("unclaimed composite {key}")))?;

        let role = match &claim.source {
            CompositeSource::Realm => self
                .client
                .get_realm_role(realm, &claim.name)
                .await
                .context(|| format!("resolving composite role {} in realm {realm}", claim.name))?,
            CompositeSource::Client(entity_id) => self
                .client
                .get_client_role(realm, entity_id, &claim.name)
                .await
                .context(|| {
                    format!(
                        "resolving composite client role {} in realm {realm}",
                        claim.name
                    )
                })?,
        };
        Ok(KeyedRole {
            key: key.to_string(),
            role,
        })
    }

    async fn add(&self, items: &[KeyedRole]) -> SyncResult<()> {
        let roles: Vec<RoleRepresentation> = items.iter().map(|i| i.role.clone()).collect();
        self.client
            .add_composite_roles(self.realm, self.role_name, &roles)
            .await
            .context(|| format!("adding composites to role {}", self.role_name))
    }

    async fn remove(&self, items: &[KeyedRole]) -> SyncResult<()> {
        let roles: Vec<RoleRepresentation> = items.iter().map(|i| i.role.clone()).collect();
        self.client
            .remove_composite_roles(self.realm, self.role_name, &roles)
            .await
            .context(|| format!("removing composites from role {}", self.role_name))
    }
}

/// Converge one realm role. Returns the role's remote id once known.
pub async fn sync_role(client: &RemoteClient, spec: &RoleSpec) -> SyncResult<Option<String>> {
    let realm = &spec.realm;
    let name = &spec.name;

    let current = match client.get_realm_role(realm, name).await {
        Ok(mut current) => {
            if spec.description.is_some() {
                current.description = spec.description.clone();
            }
            if !spec.attributes.is_empty() {
                current.attributes = Some(spec.attributes.clone());
            }
            current.composite = spec.composite;
            client
                .update_realm_role(realm, name, &current)
                .await
                .context(|| format!("updating role {name} in realm {realm}"))?;
            current
        }
        Err(e) if e.is_not_found() => {
            debug!(realm = %realm, role = %name, "creating realm role");
            let rep = RoleRepresentation {
                name: name.clone(),
                description: spec.description.clone(),
                composite: spec.composite,
                attributes: (!spec.attributes.is_empty()).then(|| spec.attributes.clone()),
                ..RoleRepresentation::default()
            };
            client
                .create_realm_role(realm, &rep)
                .await
                .context(|| format!("creating role {name} in realm {realm}"))?;
            // The create endpoint returns no body; re-fetch for the id.
            client
                .get_realm_role(realm, name)
                .await
                .context(|| format!("fetching created role {name} in realm {realm}"))?
        }
        Err(e) => {
            return Err(SyncError::remote(
                format!("fetching role {name} in realm {realm}"),
                e,
            ))
        }
    };

    if spec.composite {
        sync_composites(client, spec).await?;
    }

    if spec.is_default {
        ensure_default_role_member(client, realm, name).await?;
    }

    Ok(current.id)
}

/// Diff the role's composite associations, realm and client roles alike,
/// against the claimed sets. Client-role associations are keyed by owning
/// client, so realm and client namespaces never mix.
async fn sync_composites(client: &RemoteClient, spec: &RoleSpec) -> SyncResult<SetOutcome> {
    let realm = &spec.realm;
    let name = &spec.name;

    // Owning clients are resolved up front so a bad client id aborts the
    // pass before the driver mutates anything.
    let mut claims = BTreeMap::new();
    for role in &spec.composites {
        claims.insert(
            role.clone(),
            ClaimedComposite {
                name: role.clone(),
                source: CompositeSource::Realm,
            },
        );
    }
    for (client_id, roles) in &spec.composites_client_roles {
        let entity_id = client
            .get_client_entity_id(realm, client_id)
            .await
            .context(|| format!("resolving owning client {client_id} in realm {realm}"))?;
        for role in roles {
            claims.insert(
                format!("{entity_id}-{role}"),
                ClaimedComposite {
                    name: role.clone(),
                    source: CompositeSource::Client(entity_id.clone()),
                },
            );
        }
    }
    let claimed: Vec<String> = claims.keys().cloned().collect();

    let current: Vec<KeyedRole> = client
        .get_composite_roles(realm, name)
        .await
        .context(|| format!("fetching composites of role {name} in realm {realm}"))?
        .into_iter()
        .map(|role| KeyedRole {
            key: composite_key(&role),
            role,
        })
        .collect();

    let ops = CompositeOps {
        client,
        realm,
        role_name: name,
        claims,
    };
    reconcile_named_set(&ops, &claimed, current).await
}

/// Add the role to the realm's default-role composite if it is not
/// already a member. Membership is monotonic: nothing is ever removed
/// from the default composite by this path.
async fn ensure_default_role_member(
    client: &RemoteClient,
    realm: &str,
    name: &str,
) -> SyncResult<()> {
    let default_role = default_role_name(realm);

    let members = client
        .get_composite_roles(realm, &default_role)
        .await
        .context(|| format!("fetching members of {default_role}"))?;
    if members.iter().any(|m| !m.client_role && m.name == *name) {
        return Ok(());
    }

    let role = client
        .get_realm_role(realm, name)
        .await
        .context(|| format!("resolving role {name} in realm {realm}"))?;
    client
        .add_composite_roles(realm, &default_role, &[role])
        .await
        .context(|| format!("adding {name} to {default_role}"))
}

/// Delete the remote role. Absence is success.
pub async fn remove_role(client: &RemoteClient, spec: &RoleSpec) -> SyncResult<()> {
    let realm = &spec.realm;
    let name = &spec.name;
    match client.delete_realm_role(realm, name).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(SyncError::remote(
            format!("deleting role {name} in realm {realm}"),
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_role_name_embeds_realm() {
        assert_eq!(default_role_name("master"), "default-roles-master");
    }

    #[test]
    fn composite_keys_separate_realm_and_client_namespaces() {
        let realm_role = RoleRepresentation {
            name: "audit".into(),
            container_id: Some("realm-id".into()),
            ..RoleRepresentation::default()
        };
        let client_role = RoleRepresentation {
            name: "audit".into(),
            client_role: true,
            container_id: Some("cid-billing".into()),
            ..RoleRepresentation::default()
        };
        assert_eq!(composite_key(&realm_role), "audit");
        assert_eq!(composite_key(&client_role), "cid-billing-audit");
    }
}
