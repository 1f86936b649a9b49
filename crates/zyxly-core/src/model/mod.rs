// ── Domain model ──
//
// Everything a poll cycle produces: the per-oid snapshot, the path lookup
// used to read values out of it, and the derived device descriptor.

pub mod device;
pub mod endpoint;
pub mod lookup;
pub mod snapshot;

pub use device::DeviceDescriptor;
pub use endpoint::Endpoint;
pub use lookup::{LookupError, PathSegment, display_path, lookup, parse_path};
pub use snapshot::{EndpointResult, QueryFailure, Snapshot};
