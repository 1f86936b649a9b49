// ── Polling coordinator ──
//
// Owns one router client and drives the refresh cycle: log in, fan out
// every configured query, aggregate into an immutable snapshot, derive
// the device descriptor, publish. Readers only ever see whole snapshots.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use zyxly_api::{ErrorKind, RouterClient};

use crate::config::RouterConfig;
use crate::error::CoreError;
use crate::model::{DeviceDescriptor, Endpoint, EndpointResult, PathSegment, Snapshot};
use crate::stream::SnapshotStream;

// ── Observables ──────────────────────────────────────────────────

/// Where the current (or last) cycle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CyclePhase {
    Idle,
    LoggingIn,
    Querying,
    Aggregating,
    Published,
    Failed,
}

/// Health of the update loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateStatus {
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    /// Message of the last failed cycle; cleared by the next success.
    pub last_error: Option<String>,
    pub last_error_kind: Option<ErrorKind>,
    pub consecutive_failures: u32,
    /// Cycles published since the coordinator was created.
    pub published_cycles: u64,
}

impl UpdateStatus {
    /// Consumers should present data as available only while the most
    /// recent cycle succeeded.
    pub fn is_available(&self) -> bool {
        self.last_success.is_some() && self.last_error.is_none()
    }
}

/// What one successful cycle publishes. Snapshot and descriptor are
/// swapped in together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterData {
    pub snapshot: Arc<Snapshot>,
    pub device: Option<Arc<DeviceDescriptor>>,
}

// ── Coordinator ──────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. No process-wide state:
/// every coordinator owns its client and its published data.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: RouterConfig,
    client: RouterClient,
    /// Configured oids, deduplicated, in request order.
    endpoints: Vec<String>,
    data: watch::Sender<Option<Arc<RouterData>>>,
    phase: watch::Sender<CyclePhase>,
    status: watch::Sender<UpdateStatus>,
    /// Serializes cycles so a manual refresh never overlaps a scheduled one.
    cycle: Mutex<()>,
    cancel: CancellationToken,
    /// Child token for the running poll task. Cancelled on shutdown,
    /// replaced on the next start.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a coordinator. Does NOT contact the router: call
    /// [`refresh()`](Self::refresh) or [`start()`](Self::start).
    pub fn new(config: RouterConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let client = RouterClient::new(config.credentials(), &config.transport())?;

        let mut endpoints: Vec<String> = Vec::with_capacity(config.endpoints.len());
        for oid in &config.endpoints {
            let oid = oid.trim();
            if !endpoints.iter().any(|known| known == oid) {
                endpoints.push(oid.to_owned());
            }
        }

        let (data, _) = watch::channel(None);
        let (phase, _) = watch::channel(CyclePhase::Idle);
        let (status, _) = watch::channel(UpdateStatus::default());
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        debug!(router = %config.url, ?endpoints, "coordinator created");

        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                config,
                client,
                endpoints,
                data,
                phase,
                status,
                cycle: Mutex::new(()),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &RouterClient {
        &self.inner.client
    }

    /// Oids queried each cycle.
    pub fn endpoints(&self) -> &[String] {
        &self.inner.endpoints
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Run the first cycle, then poll in the background.
    ///
    /// A failed first cycle is returned and no poll task is spawned, so
    /// the caller can report "not ready" and try again later.
    pub async fn start(&self) -> Result<Arc<RouterData>, CoreError> {
        let data = self.refresh().await?;

        let mut handles = self.inner.task_handles.lock().await;
        if handles.is_empty() {
            let child = self.inner.cancel.child_token();
            *self.inner.cancel_child.lock().await = child.clone();
            let interval = self.inner.config.poll_interval;
            handles.push(tokio::spawn(poll_task(self.clone(), interval, child)));
            info!(
                router = %self.inner.config.url,
                interval_secs = interval.as_secs(),
                "polling started"
            );
        }

        Ok(data)
    }

    /// Stop polling and discard the router session.
    ///
    /// Waits for the poll task; a cycle still in flight is abandoned
    /// before it publishes anything.
    pub async fn shutdown(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "poll task ended abnormally");
            }
        }
        drop(handles);

        self.inner.client.clear_session();
        self.inner.phase.send_replace(CyclePhase::Idle);
        debug!("coordinator shut down");
    }

    // ── Refresh cycle ────────────────────────────────────────────

    /// Run exactly one cycle and publish its result.
    ///
    /// Fails with [`CoreError::UpdateFailed`] only when login fails; per-oid
    /// query failures end up as markers inside the snapshot.
    pub async fn refresh(&self) -> Result<Arc<RouterData>, CoreError> {
        let _cycle = self.inner.cycle.lock().await;
        let started = Instant::now();
        let taken_at = Utc::now();
        self.inner
            .status
            .send_modify(|s| s.last_attempt = Some(taken_at));

        self.set_phase(CyclePhase::LoggingIn);
        if let Err(e) = self.inner.client.login().await {
            return Err(self.fail_cycle(e.to_string(), e.kind()));
        }

        self.set_phase(CyclePhase::Querying);
        let results = self.query_all().await;

        self.set_phase(CyclePhase::Aggregating);
        let snapshot = Arc::new(Snapshot::new(taken_at, started.elapsed(), results));
        let device = self.derive_device(&snapshot);
        let data = Arc::new(RouterData { snapshot, device });

        Ok(self.publish(data))
    }

    /// Issue every configured query concurrently against the shared session.
    async fn query_all(&self) -> Vec<(String, EndpointResult)> {
        let client = &self.inner.client;
        let queries = self.inner.endpoints.iter().map(|oid| async move {
            let result = client.query(oid).await;
            if let Err(ref e) = result {
                warn!(oid = %oid, kind = %e.kind(), error = %e, "query failed");
            }
            (oid.clone(), EndpointResult::from(result))
        });
        join_all(queries).await
    }

    /// Descriptor for the new snapshot.
    ///
    /// Re-extracted only when the device-status object changed; when the
    /// query failed or extraction fails, the previous descriptor is kept.
    fn derive_device(&self, snapshot: &Snapshot) -> Option<Arc<DeviceDescriptor>> {
        let oid = Endpoint::DeviceStatus.oid();
        let previous = self.inner.data.borrow().clone();
        let previous_device = previous.as_ref().and_then(|d| d.device.clone());

        let Some(status) = snapshot.value(oid) else {
            return previous_device;
        };

        let unchanged = previous
            .as_ref()
            .and_then(|d| d.snapshot.value(oid))
            .is_some_and(|prev| prev == status);
        if unchanged && previous_device.is_some() {
            return previous_device;
        }

        match DeviceDescriptor::from_device_status(status, self.inner.client.base_url()) {
            Ok(device) => {
                debug!(model = %device.model, firmware = %device.firmware_version, "device descriptor updated");
                Some(Arc::new(device))
            }
            Err(e) => {
                warn!(error = %e, "could not extract device descriptor");
                previous_device
            }
        }
    }

    fn publish(&self, data: Arc<RouterData>) -> Arc<RouterData> {
        let snapshot = &data.snapshot;
        let failed = snapshot.failed_count();
        let success_at = snapshot.taken_at();

        self.inner.data.send_replace(Some(Arc::clone(&data)));
        self.inner.status.send_modify(|s| {
            s.last_success = Some(success_at);
            s.last_error = None;
            s.last_error_kind = None;
            s.consecutive_failures = 0;
            s.published_cycles += 1;
        });
        self.set_phase(CyclePhase::Published);

        info!(
            endpoints = snapshot.len(),
            failed,
            duration_ms = u64::try_from(snapshot.duration().as_millis()).unwrap_or(u64::MAX),
            "snapshot published"
        );
        data
    }

    fn fail_cycle(&self, message: String, kind: ErrorKind) -> CoreError {
        error!(kind = %kind, error = %message, "update failed");
        self.inner.status.send_modify(|s| {
            s.last_error = Some(message.clone());
            s.last_error_kind = Some(kind);
            s.consecutive_failures = s.consecutive_failures.saturating_add(1);
        });
        self.set_phase(CyclePhase::Failed);
        CoreError::UpdateFailed { message, kind }
    }

    fn set_phase(&self, phase: CyclePhase) {
        self.inner.phase.send_if_modified(|current| {
            if *current == phase {
                false
            } else {
                debug!(from = %current, to = %phase, "cycle phase");
                *current = phase;
                true
            }
        });
    }

    // ── Observation ──────────────────────────────────────────────

    /// Register interest in published data. Polling runs only while at
    /// least one subscription is alive.
    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.inner.data.subscribe())
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.data.receiver_count()
    }

    /// Latest published data.
    pub fn data(&self) -> Option<Arc<RouterData>> {
        self.inner.data.borrow().clone()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner
            .data
            .borrow()
            .as_ref()
            .map(|d| Arc::clone(&d.snapshot))
    }

    /// Latest device descriptor.
    pub fn device(&self) -> Option<Arc<DeviceDescriptor>> {
        self.inner.data.borrow().as_ref().and_then(|d| d.device.clone())
    }

    /// Subscribe to cycle phase changes.
    pub fn phase(&self) -> watch::Receiver<CyclePhase> {
        self.inner.phase.subscribe()
    }

    /// Subscribe to cycle outcomes.
    ///
    /// Changes when a cycle starts, publishes, or fails. A failed cycle
    /// bumps `consecutive_failures` and leaves the published data alone,
    /// so this is the only place a scheduled failure is visible.
    pub fn subscribe_status(&self) -> watch::Receiver<UpdateStatus> {
        self.inner.status.subscribe()
    }

    pub fn status(&self) -> UpdateStatus {
        self.inner.status.borrow().clone()
    }

    /// Whether consumers should present data as current.
    pub fn is_available(&self) -> bool {
        self.inner.status.borrow().is_available()
    }

    /// Read `path` from the latest snapshot's result for `oid`.
    ///
    /// Never fails: before the first publication, or on any miss along the
    /// path, `default` is returned and a warning is logged.
    pub fn get(&self, oid: &str, path: &[PathSegment], default: Value) -> Value {
        match self.snapshot() {
            Some(snapshot) => snapshot.get(oid, path, default),
            None => {
                warn!(oid, "no snapshot published yet, using default");
                default
            }
        }
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: run a single cycle, hand the coordinator to `f`, shut down.
    ///
    /// Meant for CLI commands that need one consistent snapshot.
    pub async fn oneshot<F, Fut, T>(config: RouterConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Coordinator) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let coordinator = Coordinator::new(config)?;
        if let Err(e) = coordinator.refresh().await {
            coordinator.shutdown().await;
            return Err(e);
        }
        let result = f(coordinator.clone()).await;
        coordinator.shutdown().await;
        result
    }
}

// ── Background task ──────────────────────────────────────────────

/// Run a cycle every `period` until cancelled, skipping ticks while
/// nobody is subscribed.
async fn poll_task(coordinator: Coordinator, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if coordinator.subscriber_count() == 0 {
                    debug!("no subscribers, skipping poll");
                    continue;
                }
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = coordinator.refresh() => {
                        // Already recorded in the status channel by the cycle.
                        if let Err(e) = result {
                            warn!(error = %e, "scheduled refresh failed");
                        }
                    }
                }
            }
        }
    }

    debug!("poll task stopped");
}
