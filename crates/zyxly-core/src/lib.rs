// zyxly-core: Polling layer between zyxly-api and consumers (CLI).
//
// A `Coordinator` logs in, queries every configured oid concurrently and
// publishes the results as one immutable `Snapshot`. Consumers read values
// through `Snapshot::get` or the `sensors` registry.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod sensors;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{RouterConfig, TlsVerification};
pub use coordinator::{Coordinator, CyclePhase, RouterData, UpdateStatus};
pub use error::CoreError;
pub use model::{
    DeviceDescriptor, Endpoint, EndpointResult, LookupError, PathSegment, QueryFailure, Snapshot,
    display_path, parse_path,
};
pub use sensors::{SENSORS, SensorDescription, SensorReading, SensorValue, read_sensors};
pub use stream::{SnapshotStream, SnapshotWatchStream};

pub use zyxly_api::ErrorKind;
