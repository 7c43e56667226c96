//! Realm-component synchronization.

use idsync_client::components::ComponentRepresentation;
use idsync_client::RemoteClient;
use idsync_core::kinds::component::ComponentSpec;
use tracing::debug;

use crate::error::{RemoteResultExt, SyncError, SyncResult};

/// Converge one realm component. Returns the component's remote id.
pub async fn sync_component(
    client: &RemoteClient,
    spec: &ComponentSpec,
) -> SyncResult<Option<String>> {
    let realm = &spec.realm;
    let name = &spec.name;

    match client.get_component_by_name(realm, name).await {
        Ok(mut current) => {
            let id = current.id.clone().ok_or_else(|| {
                SyncError::remote(
                    format!("component {name} in realm {realm}"),
                    idsync_client::RemoteError::Parse("component without id".into()),
                )
            })?;
            current.provider_id = spec.provider_id.clone();
            current.provider_type = spec.provider_type.clone();
            current.config = spec.config.clone();
            client
                .update_component(realm, &id, &current)
                .await
                .context(|| format!("updating component {name} in realm {realm}"))?;
            Ok(Some(id))
        }
        Err(e) if e.is_not_found() => {
            debug!(realm = %realm, component = %name, "creating component");
            let rep = ComponentRepresentation {
                name: name.clone(),
                provider_id: spec.provider_id.clone(),
                provider_type: spec.provider_type.clone(),
                config: spec.config.clone(),
                ..ComponentRepresentation::default()
            };
            let id = client
                .create_component(realm, &rep)
                .await
                .context(|| format!("creating component {name} in realm {realm}"))?;
            Ok(id)
        }
        Err(e) => Err(SyncError::remote(
            format!("fetching component {name} in realm {realm}"),
            e,
        )),
    }
}

/// Delete the remote component. Absence is success.
pub async fn remove_component(client: &RemoteClient, spec: &ComponentSpec) -> SyncResult<()> {
    let realm = &spec.realm;
    let name = &spec.name;

    let current = match client.get_component_by_name(realm, name).await {
        Ok(current) => current,
        Err(e) if e.is_not_found() => return Ok(()),
        Err(e) => {
            return Err(SyncError::remote(
                format!("fetching component {name} in realm {realm}"),
                e,
            ))
        }
    };
    let Some(id) = current.id else {
        return Ok(());
    };

    match client.delete_component(realm, &id).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(SyncError::remote(
            format!("deleting component {name} in realm {realm}"),
            e,
        )),
    }
}
