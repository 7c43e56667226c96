//! Concrete convergence chains, one per resource kind.
//!
//! Realm, identity provider, and organization run multi-step chains;
//! every other kind delegates to its synchronizer from a single handler.

use async_trait::async_trait;
use idsync_client::RemoteClient;
use idsync_core::kinds::{
    AuthFlowSpec, ClientScopeSpec, ClientSpec, ComponentSpec, GroupSpec, IdentityProviderSpec,
    OrganizationSpec, RealmSpec, RoleSpec,
};
use idsync_core::object::DeclaredObject;
use idsync_sync::error::SyncError;
use idsync_sync::SyncResult;

use crate::chain::{Chain, Handler};

// ── Realm ─────────────────────────────────────────────────────────────

struct PutRealm;

#[async_trait]
impl Handler<RealmSpec> for PutRealm {
    fn name(&self) -> &'static str {
        "put-realm"
    }

    async fn handle(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<RealmSpec>,
    ) -> SyncResult<()> {
        idsync_sync::realm::put_realm(client, &object.spec).await
    }
}

struct ApplyRealmSettings;

#[async_trait]
impl Handler<RealmSpec> for ApplyRealmSettings {
    fn name(&self) -> &'static str {
        "realm-settings"
    }

    async fn handle(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<RealmSpec>,
    ) -> SyncResult<()> {
        idsync_sync::realm::apply_settings(client, &object.spec).await
    }
}

struct ConfigureEmail;

#[async_trait]
impl Handler<RealmSpec> for ConfigureEmail {
    fn name(&self) -> &'static str {
        "configure-email"
    }

    async fn handle(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<RealmSpec>,
    ) -> SyncResult<()> {
        idsync_sync::realm::configure_email(client, &object.spec).await
    }
}

/// Put realm, then settings, then email.
#[must_use]
pub fn realm_chain() -> Chain<RealmSpec> {
    Chain::new(vec![
        Box::new(PutRealm),
        Box::new(ApplyRealmSettings),
        Box::new(ConfigureEmail),
    ])
}

// ── Identity provider ─────────────────────────────────────────────────

struct PutIdentityProvider;

#[async_trait]
impl Handler<IdentityProviderSpec> for PutIdentityProvider {
    fn name(&self) -> &'static str {
        "put-identity-provider"
    }

    async fn handle(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<IdentityProviderSpec>,
    ) -> SyncResult<()> {
        idsync_sync::identity_provider::put_identity_provider(client, &object.spec).await
    }
}

struct PutIdpMappers;

#[async_trait]
impl Handler<IdentityProviderSpec> for PutIdpMappers {
    fn name(&self) -> &'static str {
        "put-idp-mappers"
    }

    async fn handle(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<IdentityProviderSpec>,
    ) -> SyncResult<()> {
        idsync_sync::identity_provider::sync_idp_mappers(client, &object.spec).await
    }
}

/// Put the provider, then replace its mappers.
#[must_use]
pub fn identity_provider_chain() -> Chain<IdentityProviderSpec> {
    Chain::new(vec![Box::new(PutIdentityProvider), Box::new(PutIdpMappers)])
}

// ── Organization ──────────────────────────────────────────────────────

struct PutOrganization;

#[async_trait]
impl Handler<OrganizationSpec> for PutOrganization {
    fn name(&self) -> &'static str {
        "put-organization"
    }

    async fn handle(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<OrganizationSpec>,
    ) -> SyncResult<()> {
        object.status.entity_id =
            idsync_sync::organization::sync_organization(client, &object.spec).await?;
        Ok(())
    }
}

struct ProcessIdpLinks;

#[async_trait]
impl Handler<OrganizationSpec> for ProcessIdpLinks {
    fn name(&self) -> &'static str {
        "process-idp-links"
    }

    async fn handle(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<OrganizationSpec>,
    ) -> SyncResult<()> {
        let org_id = object.status.entity_id.clone().ok_or_else(|| {
            SyncError::InvalidSpec(format!(
                "organization {} has no entity id yet",
                object.spec.alias
            ))
        })?;
        idsync_sync::organization::sync_organization_idps(client, &object.spec, &org_id).await
    }
}

/// Put the organization, then reconcile its identity-provider links.
#[must_use]
pub fn organization_chain() -> Chain<OrganizationSpec> {
    Chain::new(vec![Box::new(PutOrganization), Box::new(ProcessIdpLinks)])
}

// ── Single-handler kinds ──────────────────────────────────────────────

struct SyncRole;

#[async_trait]
impl Handler<RoleSpec> for SyncRole {
    fn name(&self) -> &'static str {
        "sync-role"
    }

    async fn handle(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<RoleSpec>,
    ) -> SyncResult<()> {
        object.status.entity_id = idsync_sync::role::sync_role(client, &object.spec).await?;
        Ok(())
    }
}

#[must_use]
pub fn role_chain() -> Chain<RoleSpec> {
    Chain::new(vec![Box::new(SyncRole)])
}

struct SyncGroup;

#[async_trait]
impl Handler<GroupSpec> for SyncGroup {
    fn name(&self) -> &'static str {
        "sync-group"
    }

    async fn handle(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<GroupSpec>,
    ) -> SyncResult<()> {
        object.status.entity_id = idsync_sync::group::sync_group(client, &object.spec).await?;
        Ok(())
    }
}

#[must_use]
pub fn group_chain() -> Chain<GroupSpec> {
    Chain::new(vec![Box::new(SyncGroup)])
}

struct SyncClient;

#[async_trait]
impl Handler<ClientSpec> for SyncClient {
    fn name(&self) -> &'static str {
        "sync-client"
    }

    async fn handle(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<ClientSpec>,
    ) -> SyncResult<()> {
        object.status.entity_id = idsync_sync::client::sync_client(client, &object.spec).await?;
        Ok(())
    }
}

#[must_use]
pub fn client_chain() -> Chain<ClientSpec> {
    Chain::new(vec![Box::new(SyncClient)])
}

struct SyncComponent;

#[async_trait]
impl Handler<ComponentSpec> for SyncComponent {
    fn name(&self) -> &'static str {
        "sync-component"
    }

    async fn handle(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<ComponentSpec>,
    ) -> SyncResult<()> {
        object.status.entity_id =
            idsync_sync::component::sync_component(client, &object.spec).await?;
        Ok(())
    }
}

#[must_use]
pub fn component_chain() -> Chain<ComponentSpec> {
    Chain::new(vec![Box::new(SyncComponent)])
}

struct SyncClientScope;

#[async_trait]
impl Handler<ClientScopeSpec> for SyncClientScope {
    fn name(&self) -> &'static str {
        "sync-client-scope"
    }

    async fn handle(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<ClientScopeSpec>,
    ) -> SyncResult<()> {
        object.status.entity_id =
            idsync_sync::client_scope::sync_client_scope(client, &object.spec).await?;
        Ok(())
    }
}

#[must_use]
pub fn client_scope_chain() -> Chain<ClientScopeSpec> {
    Chain::new(vec![Box::new(SyncClientScope)])
}

struct SyncAuthFlow;

#[async_trait]
impl Handler<AuthFlowSpec> for SyncAuthFlow {
    fn name(&self) -> &'static str {
        "sync-auth-flow"
    }

    async fn handle(
        &self,
        client: &RemoteClient,
        object: &mut DeclaredObject<AuthFlowSpec>,
    ) -> SyncResult<()> {
        object.status.entity_id =
            idsync_sync::auth_flow::sync_auth_flow(client, &object.spec).await?;
        Ok(())
    }
}

#[must_use]
pub fn auth_flow_chain() -> Chain<AuthFlowSpec> {
    Chain::new(vec![Box::new(SyncAuthFlow)])
}
