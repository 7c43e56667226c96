//! Auth-flow recreation against a mock remote service.

use idsync_client::{Credentials, RemoteClient, TokenManager};
use idsync_core::kinds::auth_flow::{AuthenticatorConfigClaim, AuthFlowSpec, ExecutionClaim};
use idsync_sync::auth_flow::sync_auth_flow;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
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

/// An existing flow with the claimed alias is deleted by id and fully
/// recreated: executions are created in ascending priority order, and an
/// execution carrying an authenticator config costs one extra config
/// call keyed by the just-created execution id.
#[tokio::test]
async fn existing_flow_is_recreated_with_ordered_executions() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/master/authentication/flows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "flow-old", "alias": "custom-browser", "providerId": "basic-flow"}
        ])))
        .mount(&server)
        .await;
    // The realm binds the flow as its browser flow, so it is parked on
    // the built-in flow before deletion and re-bound afterwards.
    Mock::given(method("GET"))
        .and(path("/admin/realms/master"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "realm": "master",
            "browserFlow": "custom-browser"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/master"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "realm": "master",
            "browserFlow": "browser"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/realms/master"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/admin/realms/master/authentication/flows/flow-old"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/realms/master/authentication/flows"))
        .respond_with(ResponseTemplate::new(201).insert_header(
            "Location",
            format!("{}/admin/realms/master/authentication/flows/flow-new", server.uri()).as_str(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/admin/realms/master/authentication/executions"))
        .and(body_partial_json(json!({"authenticator": "auth-cookie"})))
        .respond_with(ResponseTemplate::new(201).insert_header(
            "Location",
            format!(
                "{}/admin/realms/master/authentication/executions/exec-cookie",
                server.uri()
            )
            .as_str(),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/realms/master/authentication/executions"))
        .and(body_partial_json(json!({"authenticator": "identity-provider-redirector"})))
        .respond_with(ResponseTemplate::new(201).insert_header(
            "Location",
            format!(
                "{}/admin/realms/master/authentication/executions/exec-idp",
                server.uri()
            )
            .as_str(),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/realms/master/authentication/executions/exec-idp/config"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let spec = AuthFlowSpec {
        realm: "master".into(),
        alias: "custom-browser".into(),
        provider_id: "basic-flow".into(),
        realm_browser_flow: true,
        executions: vec![
            // Declared out of order; creation must sort by priority.
            ExecutionClaim {
                authenticator: "identity-provider-redirector".into(),
                requirement: "ALTERNATIVE".into(),
                priority: 20,
                authenticator_config: Some(AuthenticatorConfigClaim {
                    alias: "redirect-config".into(),
                    config: [("defaultProvider".to_string(), "corp-idp".to_string())]
                        .into_iter()
                        .collect(),
                }),
            },
            ExecutionClaim {
                authenticator: "auth-cookie".into(),
                requirement: "ALTERNATIVE".into(),
                priority: 10,
                authenticator_config: None,
            },
        ],
        ..AuthFlowSpec::default()
    };

    let flow_id = sync_auth_flow(&client, &spec).await.unwrap();
    assert_eq!(flow_id.as_deref(), Some("flow-new"));

    // Executions were created ascending by priority: cookie (10) first.
    let execution_posts: Vec<serde_json::Value> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| {
            r.method == wiremock::http::Method::POST
                && r.url.path() == "/admin/realms/master/authentication/executions"
        })
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect();
    assert_eq!(execution_posts.len(), 2);
    assert_eq!(execution_posts[0]["authenticator"], "auth-cookie");
    assert_eq!(
        execution_posts[1]["authenticator"],
        "identity-provider-redirector"
    );
}

/// A flow with no remote counterpart skips the delete and the browser
/// unbind.
#[tokio::test]
async fn absent_flow_is_created_directly() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/master/authentication/flows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/realms/master/authentication/flows"))
        .respond_with(ResponseTemplate::new(201).insert_header(
            "Location",
            format!("{}/admin/realms/master/authentication/flows/flow-1", server.uri()).as_str(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let spec = AuthFlowSpec {
        realm: "master".into(),
        alias: "mfa".into(),
        ..AuthFlowSpec::default()
    };

    let flow_id = sync_auth_flow(&client, &spec).await.unwrap();
    assert_eq!(flow_id.as_deref(), Some("flow-1"));
}
