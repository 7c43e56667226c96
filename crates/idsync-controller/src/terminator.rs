//! Deletion terminators: per-kind remote cleanup gating finalizer
//! release.
//!
//! Remote-side absence is success, so terminators retry safely. The
//! preserve-on-deletion escape hatch is honored by the reconcile loop
//! before a terminator (or any remote call) runs.

use async_trait::async_trait;
use idsync_client::RemoteClient;
use idsync_core::kinds::{
    AuthFlowSpec, ClientScopeSpec, ClientSpec, ComponentSpec, GroupSpec, IdentityProviderSpec,
    OrganizationSpec, RealmSpec, RoleSpec,
};
use idsync_core::object::{DeclaredObject, ResourceSpec};
use idsync_sync::SyncResult;

/// Removes one kind's remote entity on deletion.
#[async_trait]
pub trait Terminator<S: ResourceSpec>: Send + Sync {
    async fn terminate(
        &self,
        client: &RemoteClient,
        object: &DeclaredObject<S>,
    ) -> SyncResult<()>;
}

pub struct RealmTerminator;

#[async_trait]
impl Terminator<RealmSpec> for RealmTerminator {
    async fn terminate(
        &self,
        client: &RemoteClient,
        object: &DeclaredObject<RealmSpec>,
    ) -> SyncResult<()> {
        idsync_sync::realm::remove_realm(client, &object.spec).await
    }
}

pub struct RoleTerminator;

#[async_trait]
impl Terminator<RoleSpec> for RoleTerminator {
    async fn terminate(
        &self,
        client: &RemoteClient,
        object: &DeclaredObject<RoleSpec>,
    ) -> SyncResult<()> {
        idsync_sync::role::remove_role(client, &object.spec).await
    }
}

pub struct GroupTerminator;

#[async_trait]
impl Terminator<GroupSpec> for GroupTerminator {
    async fn terminate(
        &self,
        client: &RemoteClient,
        object: &DeclaredObject<GroupSpec>,
    ) -> SyncResult<()> {
        idsync_sync::group::remove_group(client, &object.spec).await
    }
}

pub struct ClientTerminator;

#[async_trait]
impl Terminator<ClientSpec> for ClientTerminator {
    async fn terminate(
        &self,
        client: &RemoteClient,
        object: &DeclaredObject<ClientSpec>,
    ) -> SyncResult<()> {
        idsync_sync::client::remove_client(client, &object.spec).await
    }
}

pub struct IdentityProviderTerminator;

#[async_trait]
impl Terminator<IdentityProviderSpec> for IdentityProviderTerminator {
    async fn terminate(
        &self,
        client: &RemoteClient,
        object: &DeclaredObject<IdentityProviderSpec>,
    ) -> SyncResult<()> {
        idsync_sync::identity_provider::remove_identity_provider(client, &object.spec).await
    }
}

pub struct OrganizationTerminator;

#[async_trait]
impl Terminator<OrganizationSpec> for OrganizationTerminator {
    async fn terminate(
        &self,
        client: &RemoteClient,
        object: &DeclaredObject<OrganizationSpec>,
    ) -> SyncResult<()> {
        idsync_sync::organization::remove_organization(client, &object.spec).await
    }
}

pub struct ComponentTerminator;

#[async_trait]
impl Terminator<ComponentSpec> for ComponentTerminator {
    async fn terminate(
        &self,
        client: &RemoteClient,
        object: &DeclaredObject<ComponentSpec>,
    ) -> SyncResult<()> {
        idsync_sync::component::remove_component(client, &object.spec).await
    }
}

pub struct ClientScopeTerminator;

#[async_trait]
impl Terminator<ClientScopeSpec> for ClientScopeTerminator {
    async fn terminate(
        &self,
        client: &RemoteClient,
        object: &DeclaredObject<ClientScopeSpec>,
    ) -> SyncResult<()> {
        idsync_sync::client_scope::remove_client_scope(client, &object.spec).await
    }
}

pub struct AuthFlowTerminator;

#[async_trait]
impl Terminator<AuthFlowSpec> for AuthFlowTerminator {
    async fn terminate(
        &self,
        client: &RemoteClient,
        object: &DeclaredObject<AuthFlowSpec>,
    ) -> SyncResult<()> {
        idsync_sync::auth_flow::remove_auth_flow(client, &object.spec).await
    }
}
