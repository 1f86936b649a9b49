use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for the `zyxly-api` crate.
///
/// The router's management API mixes "not logged in" and "bad request"
/// into the same ambiguous envelopes, so every failure is normalized into
/// one of three kinds. Each variant keeps the HTTP status or underlying
/// transport error so `zyxly-core` can decide whether to log in again.
#[derive(Debug, Error)]
pub enum Error {
    /// DNS failure, refused connection, TLS error, timeout, or an HTTP
    /// status the query endpoint does not document.
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        status: Option<u16>,
        timed_out: bool,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Wrong credentials, or a session the router no longer accepts.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The HTTP exchange succeeded but the body broke the envelope contract.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String, status: Option<u16> },
}

/// Data-free mirror of [`Error`]'s variants.
///
/// Cloneable and serializable, so it can be stored inside snapshots and
/// rendered by consumers that never see the original error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Connection,
    Authentication,
    InvalidResponse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connection => "connection",
            Self::Authentication => "authentication",
            Self::InvalidResponse => "invalid_response",
        })
    }
}

impl Error {
    /// Wrap a `reqwest` transport failure.
    pub(crate) fn transport(context: &str, err: reqwest::Error) -> Self {
        Self::Connection {
            message: format!("{context}: {err}"),
            status: err.status().map(|s| s.as_u16()),
            timed_out: err.is_timeout(),
            source: Some(err),
        }
    }

    /// A request that was abandoned because it outlived its deadline.
    pub(crate) fn timeout(limit: Duration) -> Self {
        Self::Connection {
            message: format!("request timed out after {}s", limit.as_secs_f32()),
            status: None,
            timed_out: true,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::InvalidResponse { .. } => ErrorKind::InvalidResponse,
        }
    }

    /// HTTP status code attached to the failure, if the exchange got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Connection { status, .. } | Self::InvalidResponse { status, .. } => *status,
            Self::Authentication { .. } => None,
        }
    }

    /// Returns `true` if logging in again might resolve this error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if the request was cut off by a deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Connection { timed_out: true, .. })
    }
}
