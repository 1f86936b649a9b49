#![allow(clippy::unwrap_used)]
// Integration tests for `RouterClient` using wiremock.

use std::time::{Duration, Instant};

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zyxly_api::{Credentials, Error, ErrorKind, RouterClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

fn credentials(uri: &str) -> Credentials {
    Credentials::new(
        Url::parse(uri).unwrap(),
        "admin",
        SecretString::from("secret".to_owned()),
    )
}

async fn setup() -> (MockServer, RouterClient) {
    let server = MockServer::start().await;
    let client = RouterClient::new(credentials(&server.uri()), &TransportConfig::default()).unwrap();
    (server, client)
}

async fn mount_login(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/UserLogin"))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_query(server: &MockServer, oid: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/cgi-bin/DAL"))
        .and(query_param("oid", oid))
        .respond_with(template)
        .mount(server)
        .await;
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_sends_encoded_password() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/UserLogin"))
        .and(body_partial_json(json!({
            "Input_Account": "admin",
            "Input_Passwd": "c2VjcmV0",
            "currLang": "en",
            "RememberPassword": 0,
            "SHA512_password": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "ZCFG_SUCCESS" })))
        .expect(1)
        .mount(&server)
        .await;

    client.login().await.unwrap();
}

#[tokio::test]
async fn test_login_session_cookie_is_reused_by_queries() {
    let (server, client) = setup().await;

    mount_login(
        &server,
        ResponseTemplate::new(200)
            .insert_header("set-cookie", "Session=abc123; Path=/")
            .set_body_json(json!({ "result": "ZCFG_SUCCESS" })),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/DAL"))
        .and(query_param("oid", "status"))
        .and(header("cookie", "Session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "ZCFG_SUCCESS",
            "Object": [{ "CellIntfInfo": { "RSSI": -61 } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client.has_session());
    client.login().await.unwrap();
    assert!(client.has_session());

    let status = client.query("status").await.unwrap();
    assert_eq!(status["CellIntfInfo"]["RSSI"], -61);

    client.clear_session();
    assert!(!client.has_session());
}

#[tokio::test]
async fn test_login_unauthorized() {
    let (server, client) = setup().await;
    mount_login(&server, ResponseTemplate::new(401)).await;

    let result = client.login().await;
    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(message.contains("credentials incorrect"), "got: {message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_login_rejected_result() {
    let (server, client) = setup().await;
    mount_login(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "result": "Invalid Username or Password",
            "ReplyMsg": "try again"
        })),
    )
    .await;

    let result = client.login().await;
    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(message.contains("login failed"), "got: {message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_login_numeric_result_is_authentication() {
    let (server, client) = setup().await;
    mount_login(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "result": 0 })),
    )
    .await;

    let err = client.login().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert!(err.to_string().contains("login failed: 0"), "got: {err}");
}

#[tokio::test]
async fn test_login_missing_result_field() {
    let (server, client) = setup().await;
    mount_login(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "sessionkey": 42 })),
    )
    .await;

    let err = client.login().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    assert!(err.to_string().contains("result"), "got: {err}");
}

#[tokio::test]
async fn test_login_undecodable_body() {
    let (server, client) = setup().await;
    mount_login(
        &server,
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    )
    .await;

    let err = client.login().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
}

#[tokio::test]
async fn test_login_unexpected_status_carries_code() {
    let (server, client) = setup().await;
    mount_login(&server, ResponseTemplate::new(500)).await;

    let err = client.login().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_login_connection_refused() {
    // Bind and immediately release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RouterClient::new(
        credentials(&format!("http://{addr}")),
        &TransportConfig::default(),
    )
    .unwrap();

    let err = client.login().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(err.status(), None);
}

// ── Query ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_query_returns_first_object() {
    let (server, client) = setup().await;
    mount_query(
        &server,
        "cardpage_status",
        ResponseTemplate::new(200).set_body_json(json!({
            "result": "ZCFG_SUCCESS",
            "ReplyMsg": "",
            "Object": [
                { "DeviceInfo": { "ModelName": "NR7101" } },
                { "ignored": true }
            ]
        })),
    )
    .await;

    let value = client.query("cardpage_status").await.unwrap();
    assert_eq!(value, json!({ "DeviceInfo": { "ModelName": "NR7101" } }));
}

#[tokio::test]
async fn test_query_empty_object_list_is_empty_mapping() {
    let (server, client) = setup().await;
    mount_query(
        &server,
        "lanhosts",
        ResponseTemplate::new(200).set_body_json(json!({ "result": "ZCFG_SUCCESS", "Object": [] })),
    )
    .await;

    assert_eq!(client.query("lanhosts").await.unwrap(), json!({}));
}

#[tokio::test]
async fn test_query_repeated_calls_are_identical() {
    let (server, client) = setup().await;
    mount_query(
        &server,
        "Traffic_Status",
        ResponseTemplate::new(200).set_body_json(json!({
            "result": "ZCFG_SUCCESS",
            "Object": [{ "ipIfaceSt": [{ "BytesSent": 10, "BytesReceived": 20 }] }]
        })),
    )
    .await;

    let first = client.query("Traffic_Status").await.unwrap();
    let second = client.query("Traffic_Status").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_query_session_expired() {
    let (server, client) = setup().await;
    mount_query(&server, "status", ResponseTemplate::new(401)).await;

    let err = client.query("status").await.unwrap_err();
    assert!(err.is_auth_expired(), "got: {err:?}");
}

#[tokio::test]
async fn test_query_error_envelope() {
    let (server, client) = setup().await;
    mount_query(
        &server,
        "bogus",
        ResponseTemplate::new(200).set_body_json(json!({ "result": "ZCFG_NOT_FOUND" })),
    )
    .await;

    let err = client.query("bogus").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    assert_eq!(err.status(), Some(200));
}

#[tokio::test]
async fn test_query_missing_result_field() {
    let (server, client) = setup().await;
    mount_query(
        &server,
        "status",
        ResponseTemplate::new(200).set_body_json(json!({ "Object": [{}] })),
    )
    .await;

    let err = client.query("status").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
}

#[tokio::test]
async fn test_query_undecodable_body() {
    let (server, client) = setup().await;
    mount_query(
        &server,
        "status",
        ResponseTemplate::new(200).set_body_string("not json"),
    )
    .await;

    let err = client.query("status").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
}

#[tokio::test]
async fn test_query_unexpected_status_is_connection_error() {
    let (server, client) = setup().await;
    mount_query(&server, "status", ResponseTemplate::new(503)).await;

    let err = client.query("status").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_query_timeout_cancels_request() {
    let (server, client) = setup().await;
    let client = client.with_query_timeout(Duration::from_millis(200));
    mount_query(
        &server,
        "status",
        ResponseTemplate::new(200)
            .set_delay(Duration::from_secs(3))
            .set_body_json(json!({ "result": "ZCFG_SUCCESS", "Object": [{}] })),
    )
    .await;

    let started = Instant::now();
    let err = client.query("status").await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got: {err:?}");
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(started.elapsed() < Duration::from_secs(2));
}
