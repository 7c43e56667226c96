//! Realm handler chain: step ordering and first-error-stop.

use std::sync::Arc;

use idsync_client::Credentials;
use idsync_controller::handlers::realm_chain;
use idsync_controller::terminator::RealmTerminator;
use idsync_controller::{
    ConnectionConfig, ConnectionRegistry, InMemoryStore, Reconciler, ReconcilerConfig, SpecStore,
};
use idsync_core::kinds::realm::{EmailSettings, RealmSpec};
use idsync_core::object::DeclaredObject;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn realm_object() -> DeclaredObject<RealmSpec> {
    DeclaredObject::new(
        "staging",
        "main",
        RealmSpec {
            realm_name: "staging".into(),
            display_name: Some("Staging".into()),
            email: Some(EmailSettings {
                host: "smtp.example.com".into(),
                from: "noreply@example.com".into(),
                ..EmailSettings::default()
            }),
            ..RealmSpec::default()
        },
    )
}

fn reconciler(
    store: Arc<InMemoryStore<RealmSpec>>,
    server: &MockServer,
) -> Reconciler<RealmSpec> {
    let registry = ConnectionRegistry::new();
    registry.register(
        "main",
        ConnectionConfig::new(
            server.uri(),
            Credentials::Password {
                username: "admin".into(),
                password: "admin".into(),
                client_id: "admin-cli".into(),
            },
        ),
    );
    Reconciler::new(
        store as Arc<dyn SpecStore<RealmSpec>>,
        Arc::new(registry),
        realm_chain(),
        Box::new(RealmTerminator),
        ReconcilerConfig::default(),
    )
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

/// All three steps run: put realm, settings, email. Each merges into the
/// live representation, so three updates go out.
#[tokio::test]
async fn chain_runs_all_steps_in_order() {
    let server = MockServer::start().await;
    mock_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/staging"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "realm": "staging",
            "enabled": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/realms/staging"))
        .respond_with(ResponseTemplate::new(204))
        .expect(3)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    store.put(realm_object());
    let loop_ = reconciler(store.clone(), &server);

    let outcome = loop_.reconcile("staging").await;
    assert_eq!(outcome.error, None);
    assert!(store.snapshot("staging").unwrap().status.is_ok());
}

/// A failing step stops the chain; later steps never run and the status
/// text names the failed handler.
#[tokio::test]
async fn chain_stops_at_first_failing_step() {
    let server = MockServer::start().await;
    mock_token(&server).await;
    // put-realm sees the realm; realm-settings fails on its re-fetch.
    Mock::given(method("GET"))
        .and(path("/admin/realms/staging"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "realm": "staging"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/staging"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    // Only the put-realm update goes out.
    Mock::given(method("PUT"))
        .and(path("/admin/realms/staging"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    store.put(realm_object());
    let loop_ = reconciler(store.clone(), &server);

    let outcome = loop_.reconcile("staging").await;
    let error = outcome.error.unwrap();
    assert!(error.contains("realm-settings"), "unexpected error: {error}");

    let object = store.snapshot("staging").unwrap();
    assert_eq!(object.status.failure_count, 1);
    assert_eq!(object.status.value, error);
}
