//! Identity-provider synchronization.
//!
//! The provider itself is merged into the live representation; mappers are
//! replaced wholesale on every pass because their remote identity is not
//! stable across partial updates.

use idsync_client::identity_providers::{IdentityProviderRepresentation, IdpMapperRepresentation};
use idsync_client::RemoteClient;
use idsync_core::kinds::identity_provider::IdentityProviderSpec;
use tracing::debug;

use crate::error::{RemoteResultExt, SyncError, SyncResult};

fn merge_spec(spec: &IdentityProviderSpec, rep: &mut IdentityProviderRepresentation) {
    rep.alias = spec.alias.clone();
    rep.provider_id = spec.provider_id.clone();
    if spec.display_name.is_some() {
        rep.display_name = spec.display_name.clone();
    }
    if spec.enabled.is_some() {
        rep.enabled = spec.enabled;
    }
    if spec.first_broker_login_flow_alias.is_some() {
        rep.first_broker_login_flow_alias = spec.first_broker_login_flow_alias.clone();
    }
    rep.trust_email = spec.trust_email;
    rep.store_token = spec.store_token;
    rep.link_only = spec.link_only;
    if !spec.config.is_empty() {
        rep.config = spec.config.clone();
    }
}

/// Create the identity provider if absent, otherwise merge and update.
pub async fn put_identity_provider(
    client: &RemoteClient,
    spec: &IdentityProviderSpec,
) -> SyncResult<()> {
    let realm = &spec.realm;
    let alias = &spec.alias;

    match client.get_identity_provider(realm, alias).await {
        Ok(mut current) => {
            merge_spec(spec, &mut current);
            client
                .update_identity_provider(realm, &current)
                .await
                .context(|| format!("updating identity provider {alias} in realm {realm}"))
        }
        Err(e) if e.is_not_found() => {
            debug!(realm = %realm, alias = %alias, "creating identity provider");
            let mut rep = IdentityProviderRepresentation::default();
            merge_spec(spec, &mut rep);
            client
                .create_identity_provider(realm, &rep)
                .await
                .context(|| format!("creating identity provider {alias} in realm {realm}"))
        }
        Err(e) => Err(SyncError::remote(
            format!("fetching identity provider {alias} in realm {realm}"),
            e,
        )),
    }
}

/// Replace the provider's mappers with the claimed set.
pub async fn sync_idp_mappers(client: &RemoteClient, spec: &IdentityProviderSpec) -> SyncResult<()> {
    let realm = &spec.realm;
    let alias = &spec.alias;

    let current = client
        .get_idp_mappers(realm, alias)
        .await
        .context(|| format!("fetching mappers of identity provider {alias}"))?;

    for mapper in &current {
        let Some(id) = &mapper.id else {
            continue;
        };
        client
            .delete_idp_mapper(realm, alias, id)
            .await
            .context(|| format!("deleting mapper {} of identity provider {alias}", mapper.name))?;
    }

    for claim in &spec.mappers {
        let rep = IdpMapperRepresentation {
            id: None,
            name: claim.name.clone(),
            identity_provider_alias: alias.clone(),
            identity_provider_mapper: claim.identity_provider_mapper.clone(),
            config: claim.config.clone(),
        };
        client
            .create_idp_mapper(realm, alias, &rep)
            .await
            .context(|| format!("creating mapper {} of identity provider {alias}", claim.name))?;
    }

    Ok(())
}

/// Delete the remote identity provider. Absence is success.
pub async fn remove_identity_provider(
    client: &RemoteClient,
    spec: &IdentityProviderSpec,
) -> SyncResult<()> {
    let realm = &spec.realm;
    let alias = &spec.alias;
    match client.delete_identity_provider(realm, alias).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(SyncError::remote(
            format!("deleting identity provider {alias} in realm {realm}"),
            e,
        )),
    }
}
