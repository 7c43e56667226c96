//! Reconcile-loop state machine against a mock remote service.

use std::sync::Arc;
use std::time::Duration;

use idsync_client::Credentials;
use idsync_controller::handlers::role_chain;
use idsync_controller::terminator::RoleTerminator;
use idsync_controller::{
    ConnectionConfig, ConnectionRegistry, InMemoryStore, ReconcileOutcome, Reconciler,
    ReconcilerConfig, SpecStore,
};
use idsync_core::kinds::role::RoleSpec;
use idsync_core::object::DeclaredObject;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONNECTION: &str = "main";

fn role_object(name: &str) -> DeclaredObject<RoleSpec> {
    DeclaredObject::new(
        name,
        CONNECTION,
        RoleSpec {
            realm: "master".into(),
            name: name.into(),
            ..RoleSpec::default()
        },
    )
}

fn registry_for(server: &MockServer) -> Arc<ConnectionRegistry> {
    let registry = ConnectionRegistry::new();
    registry.register(
        CONNECTION,
        ConnectionConfig::new(
            server.uri(),
            Credentials::Password {
                username: "admin".into(),
                password: "admin".into(),
                client_id: "admin-cli".into(),
            },
        ),
    );
    Arc::new(registry)
}

fn reconciler(
    store: Arc<InMemoryStore<RoleSpec>>,
    registry: Arc<ConnectionRegistry>,
) -> Reconciler<RoleSpec> {
    Reconciler::new(
        store as Arc<dyn SpecStore<RoleSpec>>,
        registry,
        role_chain(),
        Box::new(RoleTerminator),
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

#[tokio::test]
async fn successful_pass_sets_ok_and_steady_requeue() {
    let server = MockServer::start().await;
    mock_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/master/roles/viewer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "id-viewer",
            "name": "viewer"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/realms/master/roles/viewer"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    store.put(role_object("viewer"));
    let loop_ = reconciler(store.clone(), registry_for(&server));

    let outcome = loop_.reconcile("viewer").await;
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.requeue_after, Duration::from_secs(600));

    let object = store.snapshot("viewer").unwrap();
    assert!(object.status.is_ok());
    assert_eq!(object.status.failure_count, 0);
    assert_eq!(object.status.entity_id.as_deref(), Some("id-viewer"));
    assert_eq!(object.finalizer.as_deref(), Some("idsync/realmrole"));
}

#[tokio::test]
async fn token_is_fetched_once_across_passes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/realms/master/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "expires_in": 300
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/master/roles/viewer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "id-viewer",
            "name": "viewer"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/realms/master/roles/viewer"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    store.put(role_object("viewer"));
    let loop_ = reconciler(store.clone(), registry_for(&server));

    // Two passes over one connection share the registry's cached client,
    // so the second pass reuses the first pass's token.
    assert_eq!(loop_.reconcile("viewer").await.error, None);
    assert_eq!(loop_.reconcile("viewer").await.error, None);

    let token_fetches = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/realms/master/protocol/openid-connect/token")
        .count();
    assert_eq!(token_fetches, 1);
}

#[tokio::test]
async fn failures_back_off_monotonically() {
    let server = MockServer::start().await;
    mock_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/master/roles/viewer"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    store.put(role_object("viewer"));
    let loop_ = reconciler(store.clone(), registry_for(&server));

    let mut delays = Vec::new();
    for _ in 0..3 {
        let outcome = loop_.reconcile("viewer").await;
        assert!(outcome.error.is_some());
        delays.push(outcome.requeue_after);
    }

    assert_eq!(
        delays,
        vec![
            Duration::from_secs(10),
            Duration::from_secs(20),
            Duration::from_secs(30)
        ]
    );

    let object = store.snapshot("viewer").unwrap();
    assert_eq!(object.status.failure_count, 3);
    assert!(object.status.value.contains("boom"));
}

#[tokio::test]
async fn success_resets_failure_count() {
    let server = MockServer::start().await;
    mock_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/master/roles/viewer"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/master/roles/viewer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "id-viewer",
            "name": "viewer"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/realms/master/roles/viewer"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    store.put(role_object("viewer"));
    let loop_ = reconciler(store.clone(), registry_for(&server));

    assert!(loop_.reconcile("viewer").await.error.is_some());
    assert_eq!(store.snapshot("viewer").unwrap().status.failure_count, 1);

    assert_eq!(loop_.reconcile("viewer").await.error, None);
    let object = store.snapshot("viewer").unwrap();
    assert!(object.status.is_ok());
    assert_eq!(object.status.failure_count, 0);
}

#[tokio::test]
async fn missing_connection_requeues_without_counting_failure() {
    let store = Arc::new(InMemoryStore::new());
    store.put(role_object("viewer"));
    let loop_ = reconciler(store.clone(), Arc::new(ConnectionRegistry::new()));

    let outcome = loop_.reconcile("viewer").await;
    assert!(outcome.error.is_some());
    assert_eq!(outcome.requeue_after, Duration::from_secs(60));
    assert_eq!(store.snapshot("viewer").unwrap().status.failure_count, 0);
}

#[tokio::test]
async fn unknown_object_is_silently_done() {
    let server = MockServer::start().await;
    let store: Arc<InMemoryStore<RoleSpec>> = Arc::new(InMemoryStore::new());
    let loop_ = reconciler(store, registry_for(&server));

    assert_eq!(loop_.reconcile("ghost").await, ReconcileOutcome::done());
}

#[tokio::test]
async fn deletion_of_absent_remote_entity_is_success() {
    let server = MockServer::start().await;
    mock_token(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/admin/realms/master/roles/viewer"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no role"))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    let mut object = role_object("viewer");
    object.ensure_finalizer("idsync/realmrole");
    object.deletion_requested = true;
    store.put(object);
    let loop_ = reconciler(store.clone(), registry_for(&server));

    let outcome = loop_.reconcile("viewer").await;
    assert_eq!(outcome, ReconcileOutcome::done());
    // Finalizer cleared, so the store purged the object.
    assert!(store.snapshot("viewer").is_none());
}

#[tokio::test]
async fn preserve_on_deletion_skips_remote_cleanup() {
    let server = MockServer::start().await;

    let store = Arc::new(InMemoryStore::new());
    let mut object = role_object("viewer");
    object.ensure_finalizer("idsync/realmrole");
    object.deletion_requested = true;
    object.preserve_on_deletion = true;
    store.put(object);
    let loop_ = reconciler(store.clone(), registry_for(&server));

    let outcome = loop_.reconcile("viewer").await;
    assert_eq!(outcome, ReconcileOutcome::done());
    assert!(store.snapshot("viewer").is_none());
    // Not a single remote call, token acquisition included.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_termination_keeps_finalizer_and_backs_off() {
    let server = MockServer::start().await;
    mock_token(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/admin/realms/master/roles/viewer"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    let mut object = role_object("viewer");
    object.ensure_finalizer("idsync/realmrole");
    object.deletion_requested = true;
    store.put(object);
    let loop_ = reconciler(store.clone(), registry_for(&server));

    let outcome = loop_.reconcile("viewer").await;
    assert!(outcome.error.is_some());
    assert_eq!(outcome.requeue_after, Duration::from_secs(10));

    let object = store.snapshot("viewer").unwrap();
    assert_eq!(object.finalizer.as_deref(), Some("idsync/realmrole"));
    assert_eq!(object.status.failure_count, 1);
}
