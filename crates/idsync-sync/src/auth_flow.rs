//! Authentication-flow synchronization.
//!
//! Execution ordering and step ids are not independently addressable on
//! the remote side, so an existing flow with the claimed alias is deleted
//! and fully recreated: flow first, then its executions in ascending
//! priority order, then one config call per execution that declares an
//! authenticator config. A flow bound as the realm's browser flow is
//! unbound onto the built-in default before deletion and re-bound after.

use idsync_client::auth_flows::{
    AuthenticatorConfigRepresentation, AuthFlowRepresentation, ExecutionCreatePayload,
};
use idsync_client::{RemoteClient, RemoteError};
use idsync_core::kinds::auth_flow::AuthFlowSpec;
use tracing::debug;

use crate::error::{RemoteResultExt, SyncError, SyncResult};

/// Alias of the realm's built-in browser flow, used as the parking slot
/// while a bound flow is recreated.
const BUILT_IN_BROWSER_FLOW: &str = "browser";

/// Converge one authentication flow. Returns the new flow's remote id.
pub async fn sync_auth_flow(client: &RemoteClient, spec: &AuthFlowSpec) -> SyncResult<Option<String>> {
    let realm = &spec.realm;
    let alias = &spec.alias;

    let existing = match client.get_auth_flow_by_alias(realm, alias).await {
        Ok(flow) => Some(flow),
        Err(e) if e.is_not_found() => None,
        Err(e) => {
            return Err(SyncError::remote(
                format!("fetching auth flow {alias} in realm {realm}"),
                e,
            ))
        }
    };

    if let Some(existing) = existing {
        unbind_browser_flow_if_bound(client, realm, alias).await?;

        let flow_id = existing.id.ok_or_else(|| {
            SyncError::remote(
                format!("auth flow {alias} in realm {realm}"),
                RemoteError::Parse("auth flow without id".into()),
            )
        })?;
        debug!(realm = %realm, alias = %alias, "deleting auth flow for recreation");
        client
            .delete_auth_flow(realm, &flow_id)
            .await
            .context(|| format!("deleting auth flow {alias} in realm {realm}"))?;
    }

    let rep = AuthFlowRepresentation {
        id: None,
        alias: alias.clone(),
        description: spec.description.clone(),
        provider_id: if spec.provider_id.is_empty() {
            "basic-flow".to_string()
        } else {
            spec.provider_id.clone()
        },
        top_level: true,
        built_in: false,
        ..AuthFlowRepresentation::default()
    };
    let flow_id = match client
        .create_auth_flow(realm, &rep)
        .await
        .context(|| format!("creating auth flow {alias} in realm {realm}"))?
    {
        Some(id) => id,
        None => {
            let created = client
                .get_auth_flow_by_alias(realm, alias)
                .await
                .context(|| format!("fetching created auth flow {alias}"))?;
            created.id.ok_or_else(|| {
                SyncError::remote(
                    format!("auth flow {alias} in realm {realm}"),
                    RemoteError::Parse("auth flow without id".into()),
                )
            })?
        }
    };

    create_executions(client, spec, &flow_id).await?;

    if spec.realm_browser_flow {
        bind_browser_flow(client, realm, alias).await?;
    }

    Ok(Some(flow_id))
}

/// Create the claimed executions in ascending priority order.
async fn create_executions(
    client: &RemoteClient,
    spec: &AuthFlowSpec,
    flow_id: &str,
) -> SyncResult<()> {
    let realm = &spec.realm;
    let alias = &spec.alias;

    let mut executions: Vec<_> = spec.executions.iter().collect();
    executions.sort_by_key(|e| e.priority);

    for execution in executions {
        let payload = ExecutionCreatePayload {
            authenticator: execution.authenticator.clone(),
            requirement: execution.requirement.clone(),
            priority: execution.priority,
            parent_flow: flow_id.to_string(),
            authenticator_flow: false,
        };
        let execution_id = client
            .add_flow_execution(realm, &payload)
            .await
            .context(|| {
                format!(
                    "creating execution {} of auth flow {alias}",
                    execution.authenticator
                )
            })?;

        if let Some(config) = &execution.authenticator_config {
            let execution_id = execution_id.ok_or_else(|| {
                SyncError::remote(
                    format!("execution {} of auth flow {alias}", execution.authenticator),
                    RemoteError::Parse("no execution id in create response".into()),
                )
            })?;
            let rep = AuthenticatorConfigRepresentation {
                alias: config.alias.clone(),
                config: config.config.clone(),
            };
            client
                .create_execution_config(realm, &execution_id, &rep)
                .await
                .context(|| {
                    format!(
                        "configuring execution {} of auth flow {alias}",
                        execution.authenticator
                    )
                })?;
        }
    }

    Ok(())
}

/// Park the realm on the built-in browser flow if it currently binds the
/// given alias, so the flow can be deleted.
async fn unbind_browser_flow_if_bound(
    client: &RemoteClient,
    realm: &str,
    alias: &str,
) -> SyncResult<()> {
    let mut rep = client
        .get_realm(realm)
        .await
        .context(|| format!("fetching realm {realm}"))?;

    if rep.browser_flow.as_deref() != Some(alias) {
        return Ok(());
    }

    debug!(realm = %realm, alias = %alias, "unbinding browser flow before recreation");
    rep.browser_flow = Some(BUILT_IN_BROWSER_FLOW.to_string());
    client
        .update_realm(&rep)
        .await
        .context(|| format!("unbinding browser flow of realm {realm}"))
}

/// Bind the flow as the realm's browser flow.
async fn bind_browser_flow(client: &RemoteClient, realm: &str, alias: &str) -> SyncResult<()> {
    let mut rep = client
        .get_realm(realm)
        .await
        .context(|| format!("fetching realm {realm}"))?;

    if rep.browser_flow.as_deref() == Some(alias) {
        return Ok(());
    }

    rep.browser_flow = Some(alias.to_string());
    client
        .update_realm(&rep)
        .await
        .context(|| format!("binding browser flow of realm {realm}"))
}

/// Delete the remote flow. Absence is success. A flow bound as the
/// realm's browser flow is unbound first.
pub async fn remove_auth_flow(client: &RemoteClient, spec: &AuthFlowSpec) -> SyncResult<()> {
    let realm = &spec.realm;
    let alias = &spec.alias;

    let existing = match client.get_auth_flow_by_alias(realm, alias).await {
        Ok(flow) => flow,
        Err(e) if e.is_not_found() => return Ok(()),
        Err(e) => {
            return Err(SyncError::remote(
                format!("fetching auth flow {alias} in realm {realm}"),
                e,
            ))
        }
    };
    let Some(flow_id) = existing.id else {
        return Ok(());
    };

    unbind_browser_flow_if_bound(client, realm, alias).await?;

    match client.delete_auth_flow(realm, &flow_id).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(SyncError::remote(
            format!("deleting auth flow {alias} in realm {realm}"),
            e,
        )),
    }
}
