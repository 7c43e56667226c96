//! Connection credentials and the cached-token lifecycle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{RemoteError, RemoteResult};

/// Tokens are dropped this long before their reported expiry so a token
/// that is about to lapse is never sent.
const EXPIRY_SLACK_SECS: u64 = 30;

/// Credentials for one remote connection.
///
/// The [`Debug`] impl redacts secrets to keep them out of log output.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// Resource-owner password grant against the admin CLI client.
    Password {
        username: String,
        password: String,
        #[serde(default = "default_admin_client_id")]
        client_id: String,
    },

    /// Client-credentials grant for a service account.
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
}

fn default_admin_client_id() -> String {
    "admin-cli".to_string()
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password {
                username, client_id, ..
            } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .field("client_id", client_id)
                .finish(),
            Self::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .finish(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => Instant::now() >= exp,
            None => false,
        }
    }
}

/// Acquires and caches the bearer token for one remote connection.
///
/// Acquisition and refresh run under a single async mutex shared across
/// clones, so concurrent reconciliations against the same connection never
/// race logins and churn each other's tokens.
#[derive(Debug, Clone)]
pub struct TokenManager {
    credentials: Credentials,
    token_url: String,
    http: reqwest::Client,
    cached: Arc<Mutex<Option<CachedToken>>>,
}

impl TokenManager {
    /// `token_url` is the full token-endpoint URL of the connection's
    /// authentication realm.
    #[must_use]
    pub fn new(credentials: Credentials, token_url: String, http: reqwest::Client) -> Self {
        Self {
            credentials,
            token_url,
            http,
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// Return a valid bearer token, logging in if the cache is empty or
    /// stale. The cache lock is held across the fetch so only one login is
    /// in flight per connection.
    pub async fn bearer_token(&self) -> RemoteResult<String> {
        let mut cache = self.cached.lock().await;

        if let Some(cached) = cache.as_ref() {
            if !cached.is_expired() {
                return Ok(cached.access_token.clone());
            }
        }

        debug!(token_url = %self.token_url, "acquiring access token");

        let token = self.fetch_token().await?;
        let access_token = token.access_token.clone();

        *cache = Some(token);

        Ok(access_token)
    }

    /// Drop the cached token, forcing a fresh login on the next call.
    pub async fn invalidate(&self) {
        let mut cache = self.cached.lock().await;
        *cache = None;
    }

    async fn fetch_token(&self) -> RemoteResult<CachedToken> {
        let request = match &self.credentials {
            Credentials::Password {
                username,
                password,
                client_id,
            } => self.http.post(&self.token_url).form(&[
                ("grant_type", "password"),
                ("client_id", client_id.as_str()),
                ("username", username.as_str()),
                ("password", password.as_str()),
            ]),
            Credentials::ClientCredentials {
                client_id,
                client_secret,
            } => self
                .http
                .post(&self.token_url)
                .basic_auth(client_id, Some(client_secret))
                .form(&[("grant_type", "client_credentials")]),
        };

        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Auth(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(RemoteError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Auth(format!("failed to parse token response: {e}")))?;

        let expires_at = token
            .expires_in
            .map(|secs| Instant::now() + Duration::from_secs(secs.saturating_sub(EXPIRY_SLACK_SECS)));

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials::Password {
            username: "admin".into(),
            password: "hunter2".into(),
            client_id: "admin-cli".into(),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("hunter2"));

        let creds = Credentials::ClientCredentials {
            client_id: "svc".into(),
            client_secret: "s3cr3t".into(),
        };
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("s3cr3t"));
    }

    #[test]
    fn token_without_expiry_never_expires() {
        let token = CachedToken {
            access_token: "t".into(),
            expires_at: None,
        };
        assert!(!token.is_expired());
    }

    #[test]
    fn token_past_expiry_is_expired() {
        let token = CachedToken {
            access_token: "t".into(),
            expires_at: Some(Instant::now() - Duration::from_secs(1)),
        };
        assert!(token.is_expired());
    }
}
