// ── Per-cycle snapshot ──
//
// One immutable mapping of oid → result-or-failure per poll cycle. The
// key set always equals the oids requested in that cycle; failed queries
// are kept as markers rather than dropped.

use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use zyxly_api::ErrorKind;

use super::lookup::{LookupError, PathSegment, display_path, lookup};

/// Why a single query produced no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFailure {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&zyxly_api::Error> for QueryFailure {
    fn from(err: &zyxly_api::Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            status: err.status(),
        }
    }
}

/// Outcome of one oid query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointResult {
    Ok(Value),
    Failed(QueryFailure),
}

impl EndpointResult {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&QueryFailure> {
        match self {
            Self::Ok(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

impl From<Result<Value, zyxly_api::Error>> for EndpointResult {
    fn from(result: Result<Value, zyxly_api::Error>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(ref err) => Self::Failed(QueryFailure::from(err)),
        }
    }
}

/// Everything one poll cycle learned about the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    taken_at: DateTime<Utc>,
    #[serde(with = "duration_ms", rename = "duration_ms")]
    duration: Duration,
    entries: IndexMap<String, EndpointResult>,
}

impl Snapshot {
    /// Assemble a snapshot. Keys keep the order they were requested in.
    pub fn new(
        taken_at: DateTime<Utc>,
        duration: Duration,
        entries: impl IntoIterator<Item = (String, EndpointResult)>,
    ) -> Self {
        Self {
            taken_at,
            duration,
            entries: entries.into_iter().collect(),
        }
    }

    /// When the cycle started.
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Wall time from login to aggregation.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oids in this snapshot, in request order.
    pub fn oids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EndpointResult)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn entry(&self, oid: &str) -> Option<&EndpointResult> {
        self.entries.get(oid)
    }

    /// Query result for `oid`, if that query succeeded.
    pub fn value(&self, oid: &str) -> Option<&Value> {
        self.entry(oid).and_then(EndpointResult::value)
    }

    /// Number of oids whose query failed.
    pub fn failed_count(&self) -> usize {
        self.entries.values().filter(|r| !r.is_ok()).count()
    }

    /// Resolve `path` inside the result for `oid`.
    pub fn lookup(&self, oid: &str, path: &[PathSegment]) -> Result<&Value, LookupError> {
        match self.entry(oid) {
            None => Err(LookupError::UnknownOid { oid: oid.to_owned() }),
            Some(EndpointResult::Failed(failure)) => Err(LookupError::EndpointFailed {
                oid: oid.to_owned(),
                message: failure.message.clone(),
            }),
            Some(EndpointResult::Ok(value)) => lookup(value, path),
        }
    }

    /// Read `path` from `oid`, falling back to `default` on any miss.
    ///
    /// Never fails: the reason for a miss is logged as a warning.
    pub fn get(&self, oid: &str, path: &[PathSegment], default: Value) -> Value {
        match self.lookup(oid, path) {
            Ok(value) => value.clone(),
            Err(err) => {
                warn!(oid, path = %display_path(path), error = %err, "value lookup failed, using default");
                default
            }
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
