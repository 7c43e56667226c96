//! One spec type per remote resource kind.

pub mod auth_flow;
pub mod client;
pub mod client_scope;
pub mod component;
pub mod group;
pub mod identity_provider;
pub mod organization;
pub mod realm;
pub mod role;

pub use auth_flow::AuthFlowSpec;
pub use client::ClientSpec;
pub use client_scope::ClientScopeSpec;
pub use component::ComponentSpec;
pub use group::GroupSpec;
pub use identity_provider::IdentityProviderSpec;
pub use organization::OrganizationSpec;
pub use realm::RealmSpec;
pub use role::RoleSpec;
