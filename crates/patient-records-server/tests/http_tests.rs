//! End-to-end tests against a file-backed server.

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use patient_records_server::config::ServerConfig;
use patient_records_server::patient_api_router;
use patient_records_server::server::{open_registry, serve};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tower::ServiceExt;

fn file_config(dir: &tempfile::TempDir) -> ServerConfig {
    ServerConfig {
        store_path: dir.path().join("patients.json"),
        ..ServerConfig::default()
    }
}

async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_create_view_delete_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(&dir);
    let router = patient_api_router(open_registry(&config).unwrap());

    let body = json!({"id": "P001", "name": "A", "city": "X", "age": 30,
                      "gender": "male", "height": 1.8, "weight": 81});
    let (status, _) = call(&router, "POST", "/create", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, record) = call(&router, "GET", "/view/P001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["bmi"], json!(25.0));
    assert_eq!(record["verdict"], "Normal");

    // Document on disk matches the persisted format
    let raw = std::fs::read_to_string(&config.store_path).unwrap();
    let doc: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["P001"]["verdict"], "Normal");
    assert!(doc["P001"].get("id").is_none());

    let (status, _) = call(&router, "DELETE", "/delete/P001", None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(&router, "GET", "/view/P001", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_state_survives_router_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(&dir);

    {
        let router = patient_api_router(open_registry(&config).unwrap());
        let body = json!({"id": "P007", "name": "Bond", "city": "London", "age": 40,
                          "gender": "others", "height": 1.83, "weight": 76});
        let (status, _) = call(&router, "POST", "/create", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let router = patient_api_router(open_registry(&config).unwrap());
    let (status, all) = call(&router, "GET", "/view", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["P007"]["gender"], "others");

    // A later unrelated edit keeps the stored gender
    let (status, _) = call(&router, "PUT", "/edit/P007", Some(json!({"age": 41}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, record) = call(&router, "GET", "/view/P007", None).await;
    assert_eq!(record["age"], 41);
    assert_eq!(record["gender"], "others");
}

#[tokio::test]
async fn test_unreadable_store_returns_500() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(&dir);
    let router = patient_api_router(open_registry(&config).unwrap());

    std::fs::write(&config.store_path, "not json").unwrap();

    let (status, body) = call(&router, "GET", "/view", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INTERNAL");
}

#[tokio::test]
async fn test_serve_over_tcp_and_shut_down() {
    let dir = tempfile::tempdir().unwrap();
    let registry = open_registry(&file_config(&dir)).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(serve(listener, registry, async move {
        let _ = shutdown_rx.await;
    }));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK"));
    assert!(response.contains(r#""status":"ok""#));

    shutdown_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
