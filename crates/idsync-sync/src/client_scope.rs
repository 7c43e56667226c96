//! Client-scope synchronization: base put, scope-type assignment, and the
//! protocol-mapper diff.

use std::collections::BTreeMap;

use async_trait::async_trait;
use idsync_client::client_scopes::{ClientScopeRepresentation, ProtocolMapperRepresentation};
use idsync_client::RemoteClient;
use idsync_core::kinds::client_scope::{ClientScopeSpec, ProtocolMapperClaim, ScopeType};
use tracing::{debug, warn};

use crate::diff::{reconcile_named_set, NamedSetOps};
use crate::error::{RemoteResultExt, SyncError, SyncResult};

/// Protocol mappers of one scope, diffed by name. Additions are built
/// from the claims (no remote lookup is needed) and batched into one
/// add-models call; the remote API deletes mappers one at a time.
struct ScopeMapperOps<'a> {
    client: &'a RemoteClient,
    realm: &'a str,
    scope_id: &'a str,
    default_protocol: &'a str,
    claims: BTreeMap<String, &'a ProtocolMapperClaim>,
}

#[async_trait]
impl NamedSetOps for ScopeMapperOps<'_> {
    type Item = ProtocolMapperRepresentation;

    fn item_name(item: &ProtocolMapperRepresentation) -> &str {
        &item.name
    }

    async fn resolve(&self, name: &str) -> SyncResult<ProtocolMapperRepresentation> {
        let claim = self
            .claims
            .get(name)
            .ok_or_else(|| SyncError::InvalidSpec(format!("unclaimed protocol mapper {name}")))?;
        let protocol = if !claim.protocol.is_empty() {
            claim.protocol.clone()
        } else if !self.default_protocol.is_empty() {
            self.default_protocol.to_string()
        } else {
            "openid-connect".to_string()
        };
        Ok(ProtocolMapperRepresentation {
            id: None,
            name: claim.name.clone(),
            protocol,
            protocol_mapper: claim.protocol_mapper.clone(),
            config: claim.config.clone(),
        })
    }

    async fn add(&self, items: &[ProtocolMapperRepresentation]) -> SyncResult<()> {
        self.client
            .add_protocol_mappers(self.realm, self.scope_id, items)
            .await
            .context(|| format!("adding protocol mappers to scope {}", self.scope_id))
    }

    async fn remove(&self, items: &[ProtocolMapperRepresentation]) -> SyncResult<()> {
        for item in items {
            let Some(id) = &item.id else {
                warn!(mapper = %item.name, "skipping mapper without id");
                continue;
            };
            self.client
                .delete_protocol_mapper(self.realm, self.scope_id, id)
                .await
                .context(|| format!("deleting protocol mapper {} of scope {}", item.name, self.scope_id))?;
        }
        Ok(())
    }
}

/// Converge one client scope. Returns the scope's remote id.
pub async fn sync_client_scope(
    client: &RemoteClient,
    spec: &ClientScopeSpec,
) -> SyncResult<Option<String>> {
    let realm = &spec.realm;
    let name = &spec.name;

    let scope_id = match client.get_client_scope_by_name(realm, name).await {
        Ok(mut current) => {
            let id = current.id.clone().ok_or_else(|| {
                SyncError::remote(
                    format!("client scope {name} in realm {realm}"),
                    idsync_client::RemoteError::Parse("client scope without id".into()),
                )
            })?;
            if spec.description.is_some() {
                current.description = spec.description.clone();
            }
            if !spec.protocol.is_empty() {
                current.protocol = Some(spec.protocol.clone());
            }
            if !spec.attributes.is_empty() {
                current.attributes = Some(spec.attributes.clone());
            }
            client
                .update_client_scope(realm, &id, &current)
                .await
                .context(|| format!("updating client scope {name} in realm {realm}"))?;
            id
        }
        Err(e) if e.is_not_found() => {
            debug!(realm = %realm, scope = %name, "creating client scope");
            let rep = ClientScopeRepresentation {
                name: name.clone(),
                description: spec.description.clone(),
                protocol: (!spec.protocol.is_empty()).then(|| spec.protocol.clone()),
                attributes: (!spec.attributes.is_empty()).then(|| spec.attributes.clone()),
                ..ClientScopeRepresentation::default()
            };
            match client
                .create_client_scope(realm, &rep)
                .await
                .context(|| format!("creating client scope {name} in realm {realm}"))?
            {
                Some(id) => id,
                None => {
                    let created = client
                        .get_client_scope_by_name(realm, name)
                        .await
                        .context(|| format!("fetching created client scope {name}"))?;
                    created.id.ok_or_else(|| {
                        SyncError::remote(
                            format!("client scope {name} in realm {realm}"),
                            idsync_client::RemoteError::Parse("client scope without id".into()),
                        )
                    })?
                }
            }
        }
        Err(e) => {
            return Err(SyncError::remote(
                format!("fetching client scope {name} in realm {realm}"),
                e,
            ))
        }
    };

    sync_scope_type(client, spec, &scope_id).await?;
    sync_protocol_mappers(client, spec, &scope_id).await?;

    Ok(Some(scope_id))
}

/// Put the scope on the realm's default or optional list per the spec and
/// take it off the other one. Membership is checked first so a settled
/// scope costs no writes.
async fn sync_scope_type(
    client: &RemoteClient,
    spec: &ClientScopeSpec,
    scope_id: &str,
) -> SyncResult<()> {
    let realm = &spec.realm;

    let in_default = client
        .get_default_client_scopes(realm)
        .await
        .context(|| format!("fetching default scopes of realm {realm}"))?
        .iter()
        .any(|s| s.id.as_deref() == Some(scope_id));
    let in_optional = client
        .get_optional_client_scopes(realm)
        .await
        .context(|| format!("fetching optional scopes of realm {realm}"))?
        .iter()
        .any(|s| s.id.as_deref() == Some(scope_id));

    let ctx = || format!("assigning scope type of {} in realm {realm}", spec.name);

    match spec.scope_type {
        ScopeType::Default => {
            if in_optional {
                client
                    .remove_optional_client_scope(realm, scope_id)
                    .await
                    .context(ctx)?;
            }
            if !in_default {
                client
                    .add_default_client_scope(realm, scope_id)
                    .await
                    .context(ctx)?;
            }
        }
        ScopeType::Optional => {
            if in_default {
                client
                    .remove_default_client_scope(realm, scope_id)
                    .await
                    .context(ctx)?;
            }
            if !in_optional {
                client
                    .add_optional_client_scope(realm, scope_id)
                    .await
                    .context(ctx)?;
            }
        }
        ScopeType::None => {
            if in_default {
                client
                    .remove_default_client_scope(realm, scope_id)
                    .await
                    .context(ctx)?;
            }
            if in_optional {
                client
                    .remove_optional_client_scope(realm, scope_id)
                    .await
                    .context(ctx)?;
            }
        }
    }

    Ok(())
}

/// Diff the scope's protocol mappers against the claims, keyed by name.
async fn sync_protocol_mappers(
    client: &RemoteClient,
    spec: &ClientScopeSpec,
    scope_id: &str,
) -> SyncResult<()> {
    let realm = &spec.realm;

    let current = client
        .get_protocol_mappers(realm, scope_id)
        .await
        .context(|| format!("fetching protocol mappers of scope {scope_id}"))?;

    let claims: BTreeMap<String, &ProtocolMapperClaim> = spec
        .protocol_mappers
        .iter()
        .map(|c| (c.name.clone(), c))
        .collect();
    let claimed: Vec<String> = spec.protocol_mappers.iter().map(|c| c.name.clone()).collect();

    let ops = ScopeMapperOps {
        client,
        realm,
        scope_id,
        default_protocol: &spec.protocol,
        claims,
    };
    reconcile_named_set(&ops, &claimed, current).await?;
    Ok(())
}

/// Delete the remote client scope. Absence is success.
pub async fn remove_client_scope(client: &RemoteClient, spec: &ClientScopeSpec) -> SyncResult<()> {
    let realm = &spec.realm;
    let name = &spec.name;

    let current = match client.get_client_scope_by_name(realm, name).await {
        Ok(current) => current,
        Err(e) if e.is_not_found() => return Ok(()),
        Err(e) => {
            return Err(SyncError::remote(
                format!("fetching client scope {name} in realm {realm}"),
                e,
            ))
        }
    };
    let Some(id) = current.id else {
        return Ok(());
    };

    match client.delete_client_scope(realm, &id).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(SyncError::remote(
            format!("deleting client scope {name} in realm {realm}"),
            e,
        )),
    }
}
