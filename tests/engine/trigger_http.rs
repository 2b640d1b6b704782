//! HTTP trigger endpoint tests.
//!
//! Binds the server on an ephemeral port, triggers runs with raw HTTP
//! requests and checks both the responses and the resulting store
//! state.

use identity_store::{MemoryStore, RealmCache};
use idp_populate::TriggerServer;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

async fn spawn_server(store: Arc<MemoryStore>) -> SocketAddr {
    let cache = Arc::clone(&store) as Arc<dyn RealmCache>;
    let server = TriggerServer::bind("127.0.0.1:0", store, Some(cache)).expect("bind failed");
    let addr = server.local_addr().expect("no local addr");
    tokio::spawn(server.serve());
    addr
}

fn http_get(addr: SocketAddr, target: &str) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect failed");
    stream
        .set_read_timeout(Some(Duration::from_secs(30)))
        .unwrap();
    write!(stream, "GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    response
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_create_realms_endpoint_populates_and_reports_ok() {
    let store = Arc::new(MemoryStore::new());
    let addr = spawn_server(Arc::clone(&store)).await;

    let response = tokio::task::spawn_blocking(move || {
        http_get(
            addr,
            "/create-realms?count=1&realm-roles-per-realm=5&groups-per-realm=3\
             &clients-per-realm=2&client-roles-per-client=2&users-per-realm=3\
             &realm-roles-per-user=2&client-roles-per-user=1&groups-per-user=1",
        )
    })
    .await
    .unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.contains(r#"{"status": "OK"}"#), "{response}");

    assert_eq!(store.realm_names().await, vec!["realm-0"]);
    let (roles, groups, clients, client_roles, users) =
        store.realm_counts("realm-0").await.unwrap();
    assert_eq!((roles, groups, clients, client_roles, users), (5, 3, 2, 4, 3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_count_is_a_400_with_error_body() {
    let store = Arc::new(MemoryStore::new());
    let addr = spawn_server(Arc::clone(&store)).await;

    let response =
        tokio::task::spawn_blocking(move || http_get(addr, "/create-realms?users-per-realm=10"))
            .await
            .unwrap();

    assert!(response.starts_with("HTTP/1.1 400 Bad Request"), "{response}");
    assert!(
        response.contains(r#""error":"Required parameter 'count' not present""#),
        "{response}"
    );
    assert!(store.realm_names().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_path_is_a_404() {
    let store = Arc::new(MemoryStore::new());
    let addr = spawn_server(store).await;

    let response = tokio::task::spawn_blocking(move || http_get(addr, "/create-everything"))
        .await
        .unwrap();
    assert!(response.starts_with("HTTP/1.1 404 Not Found"), "{response}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_health_endpoint() {
    let store = Arc::new(MemoryStore::new());
    let addr = spawn_server(store).await;

    let response = tokio::task::spawn_blocking(move || http_get(addr, "/health"))
        .await
        .unwrap();
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.contains("healthy"), "{response}");
}
