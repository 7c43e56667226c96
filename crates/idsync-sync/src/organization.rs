//! Organization synchronization and identity-provider link membership.

use async_trait::async_trait;
use idsync_client::organizations::{OrganizationDomain, OrganizationRepresentation};
use idsync_client::RemoteClient;
use idsync_core::kinds::organization::OrganizationSpec;
use tracing::debug;

use crate::diff::{reconcile_named_set, NamedSetOps};
use crate::error::{RemoteResultExt, SyncError, SyncResult};

/// IdP link membership of one organization. The remote API links and
/// unlinks one provider at a time, so `add`/`remove` loop per item; the
/// abort-before-mutate ordering of the driver still holds.
struct OrgIdpLinkOps<'a> {
    client: &'a RemoteClient,
    realm: &'a str,
    org_id: &'a str,
}

#[async_trait]
impl NamedSetOps for OrgIdpLinkOps<'_> {
    type Item = String;

    fn item_name(item: &String) -> &str {
        item
    }

    async fn resolve(&self, alias: &str) -> SyncResult<String> {
        // The link call takes the alias directly; resolution just checks
        // the provider exists so a typo aborts before any link changes.
        self.client
            .get_identity_provider(self.realm, alias)
            .await
            .context(|| format!("resolving identity provider {alias} in realm {}", self.realm))?;
        Ok(alias.to_string())
    }

    async fn add(&self, items: &[String]) -> SyncResult<()> {
        for alias in items {
            self.client
                .link_organization_idp(self.realm, self.org_id, alias)
                .await
                .context(|| format!("linking identity provider {alias} to {}", self.org_id))?;
        }
        Ok(())
    }

    async fn remove(&self, items: &[String]) -> SyncResult<()> {
        for alias in items {
            self.client
                .unlink_organization_idp(self.realm, self.org_id, alias)
                .await
                .context(|| format!("unlinking identity provider {alias} from {}", self.org_id))?;
        }
        Ok(())
    }
}

/// Domains from the spec, keeping the verified flag of any domain already
/// present on the remote side.
fn claimed_domains(spec: &OrganizationSpec, current: &[OrganizationDomain]) -> Vec<OrganizationDomain> {
    spec.domains
        .iter()
        .map(|name| OrganizationDomain {
            name: name.clone(),
            verified: current.iter().any(|d| &d.name == name && d.verified),
        })
        .collect()
}

/// Converge one organization. Returns the organization's remote id.
pub async fn sync_organization(
    client: &RemoteClient,
    spec: &OrganizationSpec,
) -> SyncResult<Option<String>> {
    let realm = &spec.realm;
    let alias = &spec.alias;

    let org_id = match client.get_organization_by_alias(realm, alias).await {
        Ok(mut current) => {
            let id = current.id.clone().ok_or_else(|| {
                SyncError::remote(
                    format!("organization {alias} in realm {realm}"),
                    idsync_client::RemoteError::Parse("organization without id".into()),
                )
            })?;
            current.name = spec.name.clone();
            if spec.description.is_some() {
                current.description = spec.description.clone();
            }
            current.domains = claimed_domains(spec, &current.domains);
            client
                .update_organization(realm, &id, &current)
                .await
                .context(|| format!("updating organization {alias} in realm {realm}"))?;
            id
        }
        Err(e) if e.is_not_found() => {
            debug!(realm = %realm, alias = %alias, "creating organization");
            let rep = OrganizationRepresentation {
                alias: alias.clone(),
                name: spec.name.clone(),
                description: spec.description.clone(),
                domains: claimed_domains(spec, &[]),
                ..OrganizationRepresentation::default()
            };
            match client
                .create_organization(realm, &rep)
                .await
                .context(|| format!("creating organization {alias} in realm {realm}"))?
            {
                Some(id) => id,
                None => {
                    let created = client
                        .get_organization_by_alias(realm, alias)
                        .await
                        .context(|| format!("fetching created organization {alias}"))?;
                    created.id.ok_or_else(|| {
                        SyncError::remote(
                            format!("organization {alias} in realm {realm}"),
                            idsync_client::RemoteError::Parse("organization without id".into()),
                        )
                    })?
                }
            }
        }
        Err(e) => {
            return Err(SyncError::remote(
                format!("fetching organization {alias} in realm {realm}"),
                e,
            ))
        }
    };

    Ok(Some(org_id))
}

/// Reconcile the organization's identity-provider links.
pub async fn sync_organization_idps(
    client: &RemoteClient,
    spec: &OrganizationSpec,
    org_id: &str,
) -> SyncResult<()> {
    let realm = &spec.realm;

    let links = client
        .get_organization_idps(realm, org_id)
        .await
        .context(|| format!("fetching identity providers of organization {org_id}"))?;
    let current: Vec<String> = links.into_iter().map(|l| l.alias).collect();

    let ops = OrgIdpLinkOps {
        client,
        realm,
        org_id,
    };
    reconcile_named_set(&ops, &spec.identity_providers, current).await?;
    Ok(())
}

/// Delete the remote organization. Absence is success.
pub async fn remove_organization(
    client: &RemoteClient,
    spec: &OrganizationSpec,
) -> SyncResult<()> {
    let realm = &spec.realm;
    let alias = &spec.alias;

    let current = match client.get_organization_by_alias(realm, alias).await {
        Ok(current) => current,
        Err(e) if e.is_not_found() => return Ok(()),
        Err(e) => {
            return Err(SyncError::remote(
                format!("fetching organization {alias} in realm {realm}"),
                e,
            ))
        }
    };
    let Some(id) = current.id else {
        return Ok(());
    };

    match client.delete_organization(realm, &id).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(SyncError::remote(
            format!("deleting organization {alias} in realm {realm}"),
            e,
        )),
    }
}
