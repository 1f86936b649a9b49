#![allow(clippy::unwrap_used)]
// Integration tests for `Coordinator` against a wiremock router.

use std::sync::Arc;
use std::time::{Duration, Instant};

use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zyxly_core::{
    Coordinator, CoreError, CyclePhase, ErrorKind, RouterConfig, SensorValue, UpdateStatus,
    parse_path, read_sensors,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> RouterConfig {
    RouterConfig::new(
        server.uri().parse().unwrap(),
        "admin",
        SecretString::from("secret".to_owned()),
    )
}

fn dal(object: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "result": "ZCFG_SUCCESS",
        "ReplyMsg": "",
        "Object": [object]
    }))
}

async fn mount_login_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/UserLogin"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "Session=s3ss10n; Path=/")
                .set_body_json(json!({ "result": "ZCFG_SUCCESS" })),
        )
        .mount(server)
        .await;
}

async fn mount_oid(server: &MockServer, oid: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/cgi-bin/DAL"))
        .and(query_param("oid", oid))
        .respond_with(template)
        .mount(server)
        .await;
}

fn device_status(firmware: &str) -> Value {
    json!({
        "DeviceInfo": {
            "ModelName": "NR7101",
            "Manufacturer": "Zyxel",
            "Description": "Odido 5G",
            "SoftwareVersion": firmware,
            "SerialNumber": "S212Y0000001",
            "UpTime": 7200
        }
    })
}

async fn mount_router(server: &MockServer) {
    mount_login_ok(server).await;
    mount_oid(
        server,
        "status",
        dal(json!({ "CellIntfInfo": { "RSSI": -63, "CurrentAccessTechnology": "5G-NSA" } })),
    )
    .await;
    mount_oid(server, "cardpage_status", dal(device_status("V1.00(ABUV.7)C0"))).await;
    mount_oid(
        server,
        "lanhosts",
        dal(json!({ "lanhosts": [{ "Active": true }, { "Active": true }] })),
    )
    .await;
    mount_oid(
        server,
        "Traffic_Status",
        dal(json!({ "ipIfaceSt": [{ "BytesSent": 100, "BytesReceived": 900 }] })),
    )
    .await;
}

async fn login_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/UserLogin")
        .count()
}

const POLL: Duration = Duration::from_secs(30);

fn polling_config(server: &MockServer) -> RouterConfig {
    let mut cfg = config(server);
    cfg.poll_interval = POLL;
    cfg
}

/// Keep the paused runtime busy so its clock only moves on `advance`,
/// never while a request to the mock server is in flight.
fn hold_clock() -> tokio::task::JoinHandle<()> {
    tokio::spawn(async {
        loop {
            tokio::task::yield_now().await;
        }
    })
}

/// Yield until `done` holds for the coordinator status.
async fn settle(coordinator: &Coordinator, done: impl Fn(&UpdateStatus) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let status = coordinator.status();
        if done(&status) {
            return;
        }
        assert!(Instant::now() < deadline, "cycle did not settle: {status:?}");
        tokio::task::yield_now().await;
    }
}

/// Let background work run for `real` wall-clock time.
async fn idle(real: Duration) {
    let until = Instant::now() + real;
    while Instant::now() < until {
        tokio::task::yield_now().await;
    }
}

// ── Full cycle ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_publishes_all_endpoints() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let coordinator = Coordinator::new(config(&server)).unwrap();

    let data = coordinator.refresh().await.unwrap();

    let snapshot = &data.snapshot;
    assert_eq!(
        snapshot.oids().collect::<Vec<_>>(),
        vec!["status", "cardpage_status", "lanhosts", "Traffic_Status"]
    );
    assert_eq!(snapshot.failed_count(), 0);
    assert_eq!(*coordinator.phase().borrow(), CyclePhase::Published);
    assert!(coordinator.is_available());
    assert_eq!(coordinator.status().published_cycles, 1);

    let device = data.device.as_ref().unwrap();
    assert_eq!(device.model, "NR7101");
    assert_eq!(device.name, "Odido 5G");
    assert_eq!(device.configuration_url, format!("http://{}", server.address().ip()));

    let readings = read_sensors(snapshot);
    let rssi = readings.iter().find(|r| r.key == "rssi").unwrap();
    assert_eq!(rssi.value, Some(SensorValue::Integer(-63)));
    let hosts = readings.iter().find(|r| r.key == "connected_devices").unwrap();
    assert_eq!(hosts.value, Some(SensorValue::Integer(2)));
}

#[tokio::test]
async fn test_login_precedes_queries() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let coordinator = Coordinator::new(config(&server)).unwrap();

    coordinator.refresh().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 5);
    assert_eq!(requests[0].url.path(), "/UserLogin");
    assert!(requests[1..].iter().all(|r| r.url.path() == "/cgi-bin/DAL"));
    assert!(
        requests[1..]
            .iter()
            .all(|r| r.headers.get("cookie").is_some_and(|c| c == "Session=s3ss10n"))
    );
}

#[tokio::test]
async fn test_partial_failure_keeps_every_key() {
    let server = MockServer::start().await;
    mount_login_ok(&server).await;
    mount_oid(&server, "status", dal(json!({ "CellIntfInfo": { "RSSI": -70 } }))).await;
    mount_oid(&server, "cardpage_status", ResponseTemplate::new(500)).await;
    mount_oid(
        &server,
        "lanhosts",
        ResponseTemplate::new(200).set_body_json(json!({ "result": "ZCFG_NO_SUCH_OBJECT" })),
    )
    .await;
    mount_oid(&server, "Traffic_Status", ResponseTemplate::new(401)).await;
    let coordinator = Coordinator::new(config(&server)).unwrap();

    let data = coordinator.refresh().await.unwrap();
    let snapshot = &data.snapshot;

    assert_eq!(snapshot.len(), 4);
    assert_eq!(snapshot.failed_count(), 3);
    assert_eq!(
        snapshot.entry("cardpage_status").unwrap().failure().unwrap().kind,
        ErrorKind::Connection
    );
    assert_eq!(
        snapshot.entry("lanhosts").unwrap().failure().unwrap().kind,
        ErrorKind::InvalidResponse
    );
    assert_eq!(
        snapshot.entry("Traffic_Status").unwrap().failure().unwrap().kind,
        ErrorKind::Authentication
    );
    assert!(data.device.is_none());
    assert!(coordinator.is_available());
}

#[tokio::test]
async fn test_slow_endpoint_times_out_alone() {
    let server = MockServer::start().await;
    mount_login_ok(&server).await;
    mount_oid(&server, "status", dal(json!({ "CellIntfInfo": { "RSSI": -58 } }))).await;
    mount_oid(
        &server,
        "lanhosts",
        dal(json!({ "lanhosts": [] })).set_delay(Duration::from_secs(5)),
    )
    .await;

    let mut cfg = config(&server);
    cfg.endpoints = vec!["status".into(), "lanhosts".into()];
    cfg.query_timeout = Duration::from_millis(300);
    let coordinator = Coordinator::new(cfg).unwrap();

    let started = Instant::now();
    let data = coordinator.refresh().await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(
        data.snapshot.get("status", &parse_path("CellIntfInfo.RSSI"), Value::Null),
        json!(-58)
    );
    let failure = data.snapshot.entry("lanhosts").unwrap().failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::Connection);
    assert!(failure.message.contains("timed out"), "got: {}", failure.message);
}

// ── Login failure ───────────────────────────────────────────────────

#[tokio::test]
async fn test_login_failure_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let coordinator = Coordinator::new(config(&server)).unwrap();
    let first = coordinator.refresh().await.unwrap();

    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/UserLogin"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = coordinator.refresh().await.unwrap_err();
    match err {
        CoreError::UpdateFailed { ref message, kind } => {
            assert_eq!(kind, ErrorKind::Authentication);
            assert!(message.contains("credentials incorrect"), "got: {message}");
        }
        other => panic!("expected UpdateFailed, got: {other:?}"),
    }

    // No query was attempted after the failed login.
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() == "/UserLogin"));

    assert_eq!(*coordinator.phase().borrow(), CyclePhase::Failed);
    assert!(!coordinator.is_available());
    let status = coordinator.status();
    assert_eq!(status.consecutive_failures, 1);
    assert!(status.last_success.is_some());
    assert!(Arc::ptr_eq(&coordinator.snapshot().unwrap(), &first.snapshot));
}

#[tokio::test]
async fn test_failed_cycle_notifies_status_subscribers() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let coordinator = Coordinator::new(config(&server)).unwrap();

    let mut stream = coordinator.subscribe();
    let mut status = coordinator.subscribe_status();
    let first = coordinator.refresh().await.unwrap();
    assert!(Arc::ptr_eq(&stream.changed().await.unwrap(), &first));
    assert!(status.borrow_and_update().is_available());

    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/UserLogin"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    assert!(coordinator.refresh().await.is_err());

    // The data channel stays quiet; the status channel carries the failure.
    assert!(!stream.has_changed());
    assert!(status.has_changed().unwrap());
    let seen = status.borrow_and_update().clone();
    assert!(!seen.is_available());
    assert_eq!(seen.consecutive_failures, 1);
    assert_eq!(seen.last_error_kind, Some(ErrorKind::Authentication));
    assert!(seen.last_error.unwrap().contains("credentials incorrect"));
    assert!(Arc::ptr_eq(&stream.latest().unwrap(), &first));
}

#[tokio::test]
async fn test_recovery_clears_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/UserLogin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "Locked" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_router(&server).await;
    let coordinator = Coordinator::new(config(&server)).unwrap();

    assert!(coordinator.refresh().await.is_err());
    assert_eq!(coordinator.status().consecutive_failures, 1);
    assert!(coordinator.snapshot().is_none());

    coordinator.refresh().await.unwrap();
    let status = coordinator.status();
    assert_eq!(status.consecutive_failures, 0);
    assert!(status.last_error.is_none());
    assert!(coordinator.is_available());
}

// ── Device descriptor ───────────────────────────────────────────────

#[tokio::test]
async fn test_device_descriptor_reused_while_unchanged() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let coordinator = Coordinator::new(config(&server)).unwrap();

    let first = coordinator.refresh().await.unwrap();
    let second = coordinator.refresh().await.unwrap();
    assert!(Arc::ptr_eq(
        first.device.as_ref().unwrap(),
        second.device.as_ref().unwrap()
    ));

    server.reset().await;
    mount_login_ok(&server).await;
    mount_oid(&server, "cardpage_status", dal(device_status("V1.00(ABUV.8)C0"))).await;
    let third = coordinator.refresh().await.unwrap();
    assert_eq!(
        third.device.as_ref().unwrap().firmware_version,
        "V1.00(ABUV.8)C0"
    );
}

#[tokio::test]
async fn test_device_descriptor_survives_bad_status() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let coordinator = Coordinator::new(config(&server)).unwrap();
    let first = coordinator.refresh().await.unwrap();

    server.reset().await;
    mount_login_ok(&server).await;
    mount_oid(&server, "cardpage_status", dal(json!({ "DeviceInfo": {} }))).await;
    let second = coordinator.refresh().await.unwrap();

    assert_eq!(second.device, first.device);
}

// ── Lookup helper ───────────────────────────────────────────────────

#[tokio::test]
async fn test_get_falls_back_to_default() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let coordinator = Coordinator::new(config(&server)).unwrap();
    coordinator.refresh().await.unwrap();

    assert_eq!(
        coordinator.get("Traffic_Status", &parse_path("ipIfaceSt.0.BytesReceived"), json!(0)),
        json!(900)
    );
    assert_eq!(
        coordinator.get("Traffic_Status", &parse_path("ipIfaceSt.3.BytesReceived"), json!(0)),
        json!(0)
    );
    assert_eq!(
        coordinator.get("wifi", &parse_path("SSID"), json!("n/a")),
        json!("n/a")
    );
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_subscribers_see_publications() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let coordinator = Coordinator::new(config(&server)).unwrap();

    let mut stream = coordinator.subscribe();
    assert!(stream.current().is_none());

    let published = coordinator.refresh().await.unwrap();
    let seen = stream.changed().await.unwrap();
    assert!(Arc::ptr_eq(&seen, &published));
}

#[tokio::test]
async fn test_start_and_shutdown() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let coordinator = Coordinator::new(config(&server)).unwrap();

    let data = coordinator.start().await.unwrap();
    assert_eq!(data.snapshot.len(), 4);
    assert!(coordinator.client().has_session());

    coordinator.shutdown().await;
    assert!(!coordinator.client().has_session());
    assert_eq!(*coordinator.phase().borrow(), CyclePhase::Idle);
}

#[tokio::test]
async fn test_start_reports_unready_router() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/UserLogin"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let coordinator = Coordinator::new(config(&server)).unwrap();

    let err = coordinator.start().await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Authentication));
    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_oneshot_runs_single_cycle() {
    let server = MockServer::start().await;
    mount_router(&server).await;

    let model = Coordinator::oneshot(config(&server), |c| async move {
        Ok(c.device().map(|d| d.model.clone()))
    })
    .await
    .unwrap();

    assert_eq!(model.as_deref(), Some("NR7101"));
    assert_eq!(server.received_requests().await.unwrap().len(), 5);
}

// ── Background polling ──────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_poll_runs_every_interval_while_subscribed() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let _clock = hold_clock();
    let coordinator = Coordinator::new(polling_config(&server)).unwrap();

    let _stream = coordinator.subscribe();
    coordinator.start().await.unwrap();
    assert_eq!(login_count(&server).await, 1);

    for cycle in 2..=4_u64 {
        tokio::time::advance(POLL).await;
        settle(&coordinator, |s| s.published_cycles == cycle).await;
        assert_eq!(login_count(&server).await, usize::try_from(cycle).unwrap());
    }

    coordinator.shutdown().await;
    tokio::time::advance(POLL).await;
    idle(Duration::from_millis(200)).await;
    assert_eq!(login_count(&server).await, 4);
}

#[tokio::test(start_paused = true)]
async fn test_poll_skips_ticks_without_subscribers() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let _clock = hold_clock();
    let coordinator = Coordinator::new(polling_config(&server)).unwrap();

    coordinator.start().await.unwrap();
    assert_eq!(coordinator.subscriber_count(), 0);

    tokio::time::advance(POLL).await;
    idle(Duration::from_millis(200)).await;
    assert_eq!(login_count(&server).await, 1);
    assert_eq!(coordinator.status().published_cycles, 1);

    let stream = coordinator.subscribe();
    tokio::time::advance(POLL).await;
    settle(&coordinator, |s| s.published_cycles == 2).await;
    assert_eq!(login_count(&server).await, 2);

    drop(stream);
    tokio::time::advance(POLL).await;
    idle(Duration::from_millis(200)).await;
    assert_eq!(login_count(&server).await, 2);

    coordinator.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_poll_retries_after_failed_cycle() {
    let server = MockServer::start().await;
    mount_router(&server).await;
    let _clock = hold_clock();
    let coordinator = Coordinator::new(polling_config(&server)).unwrap();

    let mut stream = coordinator.subscribe();
    let mut status = coordinator.subscribe_status();
    let first = coordinator.start().await.unwrap();
    status.borrow_and_update();
    stream.changed().await.unwrap();

    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/UserLogin"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_router(&server).await;

    tokio::time::advance(POLL).await;
    settle(&coordinator, |s| s.consecutive_failures == 1).await;
    assert!(status.has_changed().unwrap());
    assert!(!status.borrow_and_update().is_available());
    assert!(!stream.has_changed());
    assert!(Arc::ptr_eq(&coordinator.snapshot().unwrap(), &first.snapshot));
    assert_eq!(login_count(&server).await, 1);

    tokio::time::advance(POLL).await;
    settle(&coordinator, |s| s.published_cycles == 2).await;
    assert!(status.borrow_and_update().is_available());
    assert_eq!(login_count(&server).await, 2);
    assert!(!Arc::ptr_eq(&stream.changed().await.unwrap(), &first));

    coordinator.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_poll_never_overlaps_manual_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/UserLogin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": "ZCFG_SUCCESS" }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    mount_router(&server).await;
    let _clock = hold_clock();
    let coordinator = Coordinator::new(polling_config(&server)).unwrap();

    let _stream = coordinator.subscribe();
    coordinator.start().await.unwrap();

    // One scheduled cycle and two manual ones, each held up by a slow login.
    let started = Instant::now();
    tokio::time::advance(POLL).await;
    let (a, b) = tokio::join!(coordinator.refresh(), coordinator.refresh());
    a.unwrap();
    b.unwrap();
    settle(&coordinator, |s| s.published_cycles == 4).await;

    assert!(
        started.elapsed() >= Duration::from_millis(600),
        "cycles overlapped: {:?}",
        started.elapsed()
    );
    assert_eq!(login_count(&server).await, 4);

    coordinator.shutdown().await;
}
