//! OIDC client synchronization, including service-account role
//! assignments.

use async_trait::async_trait;
use idsync_client::clients::ClientRepresentation;
use idsync_client::roles::RoleRepresentation;
use idsync_client::RemoteClient;
use idsync_core::kinds::client::ClientSpec;
use tracing::debug;

use crate::diff::{reconcile_named_set, NamedSetOps};
use crate::error::{RemoteResultExt, SyncError, SyncResult};

struct UserRealmRoleOps<'a> {
    client: &'a RemoteClient,
    realm: &'a str,
    user_id: &'a str,
}

#[async_trait]
impl NamedSetOps for UserRealmRoleOps<'_> {
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
            .add_user_realm_roles(self.realm, self.user_id, items)
            .await
            .context(|| format!("assigning realm roles to user {}", self.user_id))
    }

    async fn remove(&self, items: &[RoleRepresentation]) -> SyncResult<()> {
        self.client
            .delete_user_realm_roles(self.realm, self.user_id, items)
            .await
            .context(|| format!("unassigning realm roles from user {}", self.user_id))
    }
}

fn merge_spec(spec: &ClientSpec, rep: &mut ClientRepresentation) {
    rep.client_id = spec.client_id.clone();
    if spec.description.is_some() {
        rep.description = spec.description.clone();
    }
    if spec.enabled.is_some() {
        rep.enabled = spec.enabled;
    }
    rep.public_client = spec.public_client;
    if spec.standard_flow_enabled.is_some() {
        rep.standard_flow_enabled = spec.standard_flow_enabled;
    }
    if spec.direct_access_grants_enabled.is_some() {
        rep.direct_access_grants_enabled = spec.direct_access_grants_enabled;
    }
    if !spec.redirect_uris.is_empty() {
        rep.redirect_uris = spec.redirect_uris.clone();
    }
    if !spec.web_origins.is_empty() {
        rep.web_origins = spec.web_origins.clone();
    }
    if !spec.attributes.is_empty() {
        rep.attributes = Some(spec.attributes.clone());
    }
    if spec.service_account.is_some() {
        rep.service_accounts_enabled = Some(true);
    }
}

/// Converge one client. Returns the client's system-assigned entity id.
pub async fn sync_client(client: &RemoteClient, spec: &ClientSpec) -> SyncResult<Option<String>> {
    let realm = &spec.realm;
    let client_id = &spec.client_id;

    let entity_id = match client.get_client(realm, client_id).await {
        Ok(mut current) => {
            let id = current.id.clone().ok_or_else(|| {
                SyncError::remote(
                    format!("client {client_id} in realm {realm}"),
                    idsync_client::RemoteError::Parse("client without id".into()),
                )
            })?;
            merge_spec(spec, &mut current);
            client
                .update_client(realm, &id, &current)
                .await
                .context(|| format!("updating client {client_id} in realm {realm}"))?;
            id
        }
        Err(e) if e.is_not_found() => {
            debug!(realm = %realm, client_id = %client_id, "creating client");
            let mut rep = ClientRepresentation::default();
            merge_spec(spec, &mut rep);
            match client
                .create_client(realm, &rep)
                .await
                .context(|| format!("creating client {client_id} in realm {realm}"))?
            {
                Some(id) => id,
                None => client
                    .get_client_entity_id(realm, client_id)
                    .await
                    .context(|| format!("fetching created client {client_id}"))?,
            }
        }
        Err(e) => {
            return Err(SyncError::remote(
                format!("fetching client {client_id} in realm {realm}"),
                e,
            ))
        }
    };

    if let Some(service_account) = &spec.service_account {
        sync_service_account_roles(client, spec, &entity_id, &service_account.realm_roles).await?;
    }

    Ok(Some(entity_id))
}

/// Reconcile the realm roles of the client's service-account user.
async fn sync_service_account_roles(
    client: &RemoteClient,
    spec: &ClientSpec,
    entity_id: &str,
    claimed: &[String],
) -> SyncResult<()> {
    let realm = &spec.realm;

    let user = client
        .get_service_account_user(realm, entity_id)
        .await
        .context(|| format!("fetching service account of client {}", spec.client_id))?;

    let mappings = client
        .get_user_role_mappings(realm, &user.id)
        .await
        .context(|| format!("fetching role mappings of user {}", user.id))?;

    let ops = UserRealmRoleOps {
        client,
        realm,
        user_id: &user.id,
    };
    reconcile_named_set(&ops, claimed, mappings.realm_mappings.unwrap_or_default()).await?;
    Ok(())
}

/// Delete the remote client. Absence is success.
pub async fn remove_client(client: &RemoteClient, spec: &ClientSpec) -> SyncResult<()> {
    let realm = &spec.realm;
    let client_id = &spec.client_id;

    let current = match client.get_client(realm, client_id).await {
        Ok(current) => current,
        Err(e) if e.is_not_found() => return Ok(()),
        Err(e) => {
            return Err(SyncError::remote(
                format!("fetching client {client_id} in realm {realm}"),
                e,
            ))
        }
    };
    let Some(id) = current.id else {
        return Ok(());
    };

    match client.delete_client(realm, &id).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(SyncError::remote(
            format!("deleting client {client_id} in realm {realm}"),
            e,
        )),
    }
}
