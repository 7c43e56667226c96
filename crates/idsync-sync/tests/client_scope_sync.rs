//! Client-scope synchronization: scope-type assignment and the
//! protocol-mapper diff.

use idsync_client::{Credentials, RemoteClient, TokenManager};
use idsync_core::kinds::client_scope::{ClientScopeSpec, ProtocolMapperClaim, ScopeType};
use idsync_sync::client_scope::sync_client_scope;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> RemoteClient {
    let http = reqwest::Client::new();
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
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "expires_in": 300
        })))
        .mount(server)
        .await;
}

async fn mock_scope(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/admin/realms/master/client-scopes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "scope-1", "name": "api-access", "protocol": "openid-connect"}
        ])))
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/realms/master/client-scopes/scope-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

/// Claimed mappers are diffed by name: one batched add-models call for
/// the missing mapper, one delete per stale mapper.
#[tokio::test]
async fn protocol_mappers_are_diffed_by_name() {
    let server = MockServer::start().await;
    mock_token(&server).await;
    mock_scope(&server).await;

    // Scope type lists: already default, nothing to change.
    Mock::given(method("GET"))
        .and(path("/admin/realms/master/default-default-client-scopes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "scope-1", "name": "api-access"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/master/default-optional-client-scopes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/master/client-scopes/scope-1/protocol-mappers/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "m-keep",
                "name": "audience",
                "protocol": "openid-connect",
                "protocolMapper": "oidc-audience-mapper"
            },
            {
                "id": "m-stale",
                "name": "legacy-claim",
                "protocol": "openid-connect",
                "protocolMapper": "oidc-hardcoded-claim-mapper"
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/realms/master/client-scopes/scope-1/protocol-mappers/add-models"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/admin/realms/master/client-scopes/scope-1/protocol-mappers/models/m-stale"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let spec = ClientScopeSpec {
        realm: "master".into(),
        name: "api-access".into(),
        protocol: "openid-connect".into(),
        scope_type: ScopeType::Default,
        protocol_mappers: vec![
            ProtocolMapperClaim {
                name: "audience".into(),
                protocol: "openid-connect".into(),
                protocol_mapper: "oidc-audience-mapper".into(),
                ..ProtocolMapperClaim::default()
            },
            ProtocolMapperClaim {
                name: "groups".into(),
                protocol: "openid-connect".into(),
                protocol_mapper: "oidc-group-membership-mapper".into(),
                ..ProtocolMapperClaim::default()
            },
        ],
        ..ClientScopeSpec::default()
    };

    let scope_id = sync_client_scope(&client, &spec).await.unwrap();
    assert_eq!(scope_id.as_deref(), Some("scope-1"));
}

/// Switching a scope from default to optional removes it from one list
/// and adds it to the other.
#[tokio::test]
async fn scope_type_switches_lists() {
    let server = MockServer::start().await;
    mock_token(&server).await;
    mock_scope(&server).await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/master/default-default-client-scopes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "scope-1", "name": "api-access"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/master/default-optional-client-scopes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/admin/realms/master/default-default-client-scopes/scope-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/realms/master/default-optional-client-scopes/scope-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/master/client-scopes/scope-1/protocol-mappers/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let spec = ClientScopeSpec {
        realm: "master".into(),
        name: "api-access".into(),
        scope_type: ScopeType::Optional,
        ..ClientScopeSpec::default()
    };

    sync_client_scope(&client, &spec).await.unwrap();
}
