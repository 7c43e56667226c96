//! Per-entity-type synchronizers.
//!
//! Every synchronizer follows the same shape: fetch the current remote
//! representation by name or alias, create it if absent (recovering the
//! system-assigned id from the `Location` header or a re-fetch), otherwise
//! merge the declared fields in and update. Named collections hanging off
//! an entity (role assignments, memberships, mappers, links) go through
//! the [`diff`] driver: all additions are resolved by lookup before any
//! mutation, then one batched add and one batched remove.
//!
//! Each kind also exposes a `remove_*` helper for deletion, where
//! remote-side absence is success.

pub mod auth_flow;
pub mod client;
pub mod client_scope;
pub mod component;
pub mod diff;
pub mod error;
pub mod group;
pub mod identity_provider;
pub mod organization;
pub mod realm;
pub mod role;

pub use diff::{diff_names, reconcile_named_set, NamedSetDiff, NamedSetOps, SetOutcome};
pub use error::{SyncError, SyncResult};
