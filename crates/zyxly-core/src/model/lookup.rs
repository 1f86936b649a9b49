// ── Path lookup ──
//
// Generic traversal of untyped query results. The router's object shapes
// vary by firmware, so values are read by path rather than deserialized
// into fixed structs.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// One step of a lookup path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Mapping key.
    Key(String),
    /// Sequence position.
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Build a lookup path from keys and indices: `path!["ipIfaceSt", 0, "BytesSent"]`.
#[macro_export]
macro_rules! path {
    ($($segment:expr),* $(,)?) => {
        vec![$($crate::model::PathSegment::from($segment)),*]
    };
}

/// Parse a dotted path such as `ipIfaceSt.0.BytesSent` or
/// `ipIfaceSt[0].BytesSent`. All-digit segments become indices.
pub fn parse_path(raw: &str) -> Vec<PathSegment> {
    raw.replace('[', ".")
        .replace(']', "")
        .split('.')
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<usize>() {
            Ok(index) => PathSegment::Index(index),
            Err(_) => PathSegment::Key(s.to_owned()),
        })
        .collect()
}

/// Render a path the way [`parse_path`] reads it back.
pub fn display_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(_) => out.push_str(&segment.to_string()),
        }
    }
    out
}

/// Why a path did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("oid '{oid}' is not part of the snapshot")]
    UnknownOid { oid: String },

    #[error("oid '{oid}' has no data: {message}")]
    EndpointFailed { oid: String, message: String },

    #[error("key '{key}' not found at '{at}'")]
    MissingKey { key: String, at: String },

    #[error("index {index} out of range at '{at}' (length {len})")]
    IndexOutOfRange { index: usize, len: usize, at: String },

    #[error("'{at}' is a {found}, cannot descend into '{segment}'")]
    NotTraversable {
        segment: String,
        found: &'static str,
        at: String,
    },
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// Walk `path` from `root`.
///
/// A key segment that looks like a number also indexes a list, and an
/// index segment also matches a mapping key of the same digits, so dotted
/// paths from the command line work either way.
pub fn lookup<'v>(root: &'v Value, path: &[PathSegment]) -> Result<&'v Value, LookupError> {
    let mut current = root;
    for (depth, segment) in path.iter().enumerate() {
        let at = || {
            let walked = display_path(&path[..depth]);
            if walked.is_empty() { "<root>".to_owned() } else { walked }
        };
        current = match (current, segment) {
            (Value::Object(map), PathSegment::Key(key)) => {
                map.get(key).ok_or_else(|| LookupError::MissingKey {
                    key: key.clone(),
                    at: at(),
                })?
            }
            (Value::Object(map), PathSegment::Index(index)) => {
                let key = index.to_string();
                map.get(&key)
                    .ok_or_else(|| LookupError::MissingKey { key, at: at() })?
            }
            (Value::Array(items), PathSegment::Index(index)) => {
                items.get(*index).ok_or_else(|| LookupError::IndexOutOfRange {
                    index: *index,
                    len: items.len(),
                    at: at(),
                })?
            }
            (Value::Array(items), PathSegment::Key(key)) => match key.parse::<usize>() {
                Ok(index) => items.get(index).ok_or_else(|| LookupError::IndexOutOfRange {
                    index,
                    len: items.len(),
                    at: at(),
                })?,
                Err(_) => {
                    return Err(LookupError::NotTraversable {
                        segment: key.clone(),
                        found: "list",
                        at: at(),
                    });
                }
            },
            (scalar, segment) => {
                return Err(LookupError::NotTraversable {
                    segment: segment.to_string(),
                    found: type_name(scalar),
                    at: at(),
                });
            }
        };
    }
    Ok(current)
}
