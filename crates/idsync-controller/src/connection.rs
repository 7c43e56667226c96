//! Connection configuration and client construction.
//!
//! A declared object names its connection; the registry resolves that
//! name to one shared [`RemoteClient`], built on first use, so every
//! object on a connection reuses the same token cache and HTTP pool. A
//! name with no registered connection is a not-available condition, not a
//! failure: the object requeues on a fixed interval until the connection
//! appears.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use idsync_client::{Credentials, RemoteClient, TokenManager};
use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, ReconcileResult};

fn default_timeout_secs() -> u64 {
    30
}

fn default_tls_verify() -> bool {
    true
}

fn default_auth_realm() -> String {
    "master".to_string()
}

/// Endpoint and credentials of one remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base URL of the remote service, without the admin path.
    pub url: String,

    pub credentials: Credentials,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Realm the token endpoint lives in.
    #[serde(default = "default_auth_realm")]
    pub auth_realm: String,
}

impl ConnectionConfig {
    #[must_use]
    pub fn new(url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            url: url.into(),
            credentials,
            timeout_secs: default_timeout_secs(),
            tls_verify: default_tls_verify(),
            auth_realm: default_auth_realm(),
        }
    }

    /// Token endpoint of the connection's authentication realm.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.url.trim_end_matches('/'),
            self.auth_realm
        )
    }

    /// Build a client for this connection.
    pub fn build_client(&self) -> ReconcileResult<RemoteClient> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .danger_accept_invalid_certs(!self.tls_verify)
            .build()
            .map_err(|e| {
                ReconcileError::ConnectionNotAvailable(format!("building HTTP client: {e}"))
            })?;
        let auth = TokenManager::new(self.credentials.clone(), self.token_url(), http.clone());
        Ok(RemoteClient::with_http_client(
            self.url.clone(),
            auth,
            http,
        ))
    }
}

struct ConnectionEntry {
    config: ConnectionConfig,
    /// Built lazily on first use, then cloned out. Clones share the token
    /// cache, so every object on the connection reuses one login.
    client: Option<RemoteClient>,
}

/// Named connections, as the spec store declares them.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<String, ConnectionEntry>>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a connection. Replacing drops the cached client,
    /// so the next pass picks up the new endpoint and credentials.
    pub fn register(&self, name: impl Into<String>, config: ConnectionConfig) {
        self.connections
            .lock()
            .expect("registry lock poisoned")
            .insert(
                name.into(),
                ConnectionEntry {
                    config,
                    client: None,
                },
            );
    }

    /// Resolve a connection name to its shared client.
    pub fn client_for(&self, name: &str) -> ReconcileResult<RemoteClient> {
        let mut connections = self
            .connections
            .lock()
            .map_err(|_| ReconcileError::ConnectionNotAvailable("registry lock poisoned".into()))?;
        let entry = connections.get_mut(name).ok_or_else(|| {
            ReconcileError::ConnectionNotAvailable(format!("no connection named {name}"))
        })?;

        if let Some(client) = &entry.client {
            return Ok(client.clone());
        }
        let client = entry.config.build_client()?;
        entry.client = Some(client.clone());
        Ok(client)
    }
}
