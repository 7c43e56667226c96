//! Typed admin REST client for the remote IAM service.
//!
//! [`RemoteClient`] wraps `reqwest` with per-entity-type operations and a
//! uniform error taxonomy: absence surfaces as [`RemoteError::NotFound`],
//! duplicate creation as [`RemoteError::Conflict`], and everything callers
//! should retry via backoff as a transient error. Token acquisition and
//! refresh are handled internally by [`auth::TokenManager`]; a call that
//! fails on an expired credential is retried once after refresh before any
//! error is surfaced.

pub mod auth;
pub mod auth_flows;
pub mod client;
pub mod client_scopes;
pub mod clients;
pub mod components;
pub mod error;
pub mod groups;
pub mod identity_providers;
pub mod organizations;
pub mod realms;
pub mod roles;

pub use auth::{Credentials, TokenManager};
pub use client::RemoteClient;
pub use error::{RemoteError, RemoteResult};
