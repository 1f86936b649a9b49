// ── Core error types ──
//
// User-facing errors from zyxly-core. Consumers never see reqwest errors
// or JSON decode failures directly; the `From<zyxly_api::Error>` impl
// folds the client's three kinds into domain variants.

use thiserror::Error;
use zyxly_api::ErrorKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Client errors ────────────────────────────────────────────────
    #[error("Cannot reach router: {reason}")]
    ConnectionFailed {
        reason: String,
        status: Option<u16>,
        timed_out: bool,
    },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Invalid response from router: {message}")]
    InvalidResponse { message: String, status: Option<u16> },

    // ── Cycle errors ─────────────────────────────────────────────────
    /// A poll cycle could not produce a snapshot (login failed). The
    /// previous snapshot, if any, stays published.
    #[error("Update failed: {message}")]
    UpdateFailed { message: String, kind: ErrorKind },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Client error kind behind this failure, when there is one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::ConnectionFailed { .. } => Some(ErrorKind::Connection),
            Self::AuthenticationFailed { .. } => Some(ErrorKind::Authentication),
            Self::InvalidResponse { .. } => Some(ErrorKind::InvalidResponse),
            Self::UpdateFailed { kind, .. } => Some(*kind),
            Self::Config { .. } | Self::Internal(_) => None,
        }
    }

    /// Returns `true` if the router did not answer within the deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectionFailed { timed_out: true, .. })
    }
}

// ── Conversion from client errors ────────────────────────────────────

impl From<zyxly_api::Error> for CoreError {
    fn from(err: zyxly_api::Error) -> Self {
        match err {
            zyxly_api::Error::Connection {
                message,
                status,
                timed_out,
                ..
            } => CoreError::ConnectionFailed {
                reason: message,
                status,
                timed_out,
            },
            zyxly_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            zyxly_api::Error::InvalidResponse { message, status } => {
                CoreError::InvalidResponse { message, status }
            }
        }
    }
}

impl From<url::ParseError> for CoreError {
    fn from(err: url::ParseError) -> Self {
        CoreError::Config {
            message: format!("Invalid router URL: {err}"),
        }
    }
}
