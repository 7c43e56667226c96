//! HTTP plumbing shared by every entity-type operation.

use std::time::Duration;

use reqwest::{header, Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::TokenManager;
use crate::error::{RemoteError, RemoteResult};

/// Typed client for the remote IAM admin REST API.
///
/// One instance corresponds to one connection (endpoint + credentials).
/// Cloning shares the token cache, so clones never race logins.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    base_url: String,
    auth: TokenManager,
    http: Client,
}

impl RemoteClient {
    /// Create a client with its own HTTP pool.
    pub fn new(
        base_url: String,
        auth: TokenManager,
        timeout: Duration,
        tls_verify: bool,
    ) -> RemoteResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!tls_verify)
            .user_agent("idsync/0.4")
            .build()
            .map_err(|e| RemoteError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_http_client(base_url, auth, http))
    }

    /// Create a client with a pre-built `reqwest::Client` (used by tests).
    #[must_use]
    pub fn with_http_client(base_url: String, auth: TokenManager, http: Client) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            auth,
            http,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a URL under `/admin/realms`. `path` starts with `/`.
    pub(crate) fn admin_url(&self, path: &str) -> String {
        format!("{}/admin/realms{}", self.base_url, path)
    }

    // ── Request execution ─────────────────────────────────────────────

    /// Send one request, retrying exactly once after a token refresh when
    /// the remote side answers 401. Callers never see the first 401.
    pub(crate) async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        query: &[(&str, String)],
    ) -> RemoteResult<Response> {
        let mut refreshed = false;

        loop {
            let token = self.auth.bearer_token().await?;

            let mut builder = self
                .http
                .request(method.clone(), url)
                .bearer_auth(token);
            if !query.is_empty() {
                builder = builder.query(query);
            }
            if let Some(b) = body {
                builder = builder.json(b);
            }

            debug!(%method, url, "remote call");
            let response = builder.send().await?;

            if response.status() == StatusCode::UNAUTHORIZED && !refreshed {
                warn!(url, "token rejected, refreshing and retrying once");
                self.auth.invalidate().await;
                refreshed = true;
                continue;
            }

            return Ok(response);
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> RemoteResult<T> {
        let response = self
            .execute::<()>(Method::GET, url, None, query)
            .await?;
        Self::decode(response).await
    }

    /// POST returning the created entity's system-assigned id, parsed from
    /// the `Location` response header when present.
    pub(crate) async fn post_created<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> RemoteResult<Option<String>> {
        let response = self.execute(Method::POST, url, Some(body), &[]).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(id_from_location(&response));
        }

        Err(Self::classify(response).await)
    }

    pub(crate) async fn post_unit<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> RemoteResult<()> {
        let response = self.execute(Method::POST, url, Some(body), &[]).await?;
        Self::expect_success(response).await
    }

    pub(crate) async fn put_unit<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> RemoteResult<()> {
        let response = self.execute(Method::PUT, url, Some(body), &[]).await?;
        Self::expect_success(response).await
    }

    pub(crate) async fn put_empty(&self, url: &str) -> RemoteResult<()> {
        let response = self.execute::<()>(Method::PUT, url, None, &[]).await?;
        Self::expect_success(response).await
    }

    pub(crate) async fn delete_unit(&self, url: &str) -> RemoteResult<()> {
        let response = self
            .execute::<()>(Method::DELETE, url, None, &[])
            .await?;
        Self::expect_success(response).await
    }

    /// DELETE carrying a JSON body (batch detach endpoints).
    pub(crate) async fn delete_with_body<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> RemoteResult<()> {
        let response = self.execute(Method::DELETE, url, Some(body), &[]).await?;
        Self::expect_success(response).await
    }

    // ── Response handling ─────────────────────────────────────────────

    async fn decode<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| RemoteError::Parse(format!("failed to decode response: {e}")))
        } else {
            Err(Self::classify(response).await)
        }
    }

    async fn expect_success(response: Response) -> RemoteResult<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::classify(response).await)
        }
    }

    /// Map an error response onto the taxonomy: 404 is absence, 409 is a
    /// duplicate key, 429 is a slow-down, 401 is an auth failure (the
    /// refresh retry has already happened by now).
    pub(crate) async fn classify(response: Response) -> RemoteError {
        let status = response.status();

        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());

        match status {
            StatusCode::NOT_FOUND => RemoteError::NotFound(body),
            StatusCode::CONFLICT => RemoteError::Conflict(body),
            StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited {
                retry_after_secs: retry_after,
            },
            StatusCode::UNAUTHORIZED => {
                RemoteError::Auth(format!("authentication failed (401): {body}"))
            }
            _ => {
                let detail = if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                };
                RemoteError::Api {
                    status: status.as_u16(),
                    detail,
                }
            }
        }
    }
}

/// Last path segment of the `Location` header, if any.
fn id_from_location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|loc| loc.trim_end_matches('/').rsplit('/').next())
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> RemoteClient {
        let http = Client::new();
        let auth = TokenManager::new(
            Credentials::Password {
                username: "admin".into(),
                password: "admin".into(),
                client_id: "admin-cli".into(),
            },
            format!("{}/realms/master/protocol/openid-connect/token", server.uri()),
            http.clone(),
        );
        RemoteClient::with_http_client(server.uri(), auth, http)
    }

    async fn mock_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/realms/master/protocol/openid-connect/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok",
                "expires_in": 300
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn classifies_not_found() {
        let server = MockServer::start().await;
        mock_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/admin/realms/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no realm"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .get_json::<serde_json::Value>(&client.admin_url("/missing"), &[])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn classifies_conflict() {
        let server = MockServer::start().await;
        mock_token(&server).await;
        Mock::given(method("POST"))
            .and(path("/admin/realms/r/groups"))
            .respond_with(ResponseTemplate::new(409).set_body_string("duplicate"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .post_created(&client.admin_url("/r/groups"), &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn retries_once_after_401() {
        let server = MockServer::start().await;
        mock_token(&server).await;

        // First call is rejected; the retry (after refresh) succeeds.
        Mock::given(method("GET"))
            .and(path("/admin/realms/r"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/realms/r"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let value: serde_json::Value = client
            .get_json(&client.admin_url("/r"), &[])
            .await
            .unwrap();
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn second_401_surfaces_auth_error() {
        let server = MockServer::start().await;
        mock_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/admin/realms/r"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .get_json::<serde_json::Value>(&client.admin_url("/r"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Auth(_)));
    }
}
