//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use zyxly_config::ConfigError;
use zyxly_core::{CoreError, ErrorKind};

/// Process exit codes.
pub mod exit_code {
    #[allow(dead_code)]
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const INVALID_RESPONSE: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the router")]
    #[diagnostic(
        code(zyxly::connection_failed),
        help(
            "{reason}\n\
             Check the router address with --endpoint or `zyxly config show`.\n\
             If the router uses a certificate your system does not trust, try --insecure."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Router did not answer in time")]
    #[diagnostic(
        code(zyxly::timeout),
        help("{reason}\nIncrease the request timeout with --timeout.")
    )]
    Timeout { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(zyxly::auth_failed),
        help(
            "Verify the router account and password.\n\
             Store a new password with: zyxly config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(zyxly::no_credentials),
        help(
            "Store one with: zyxly config set-password --profile {profile}\n\
             Or set the ZYXLY_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Router responses ─────────────────────────────────────────────
    #[error("Unexpected response from router: {message}")]
    #[diagnostic(
        code(zyxly::invalid_response),
        help("The firmware may not support this object. Re-run with -vv for request details.")
    )]
    InvalidResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(zyxly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(zyxly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: zyxly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(zyxly::no_config),
        help(
            "Create one with: zyxly config init\n\
             Expected at: {path}\n\
             Or pass --endpoint and --password directly."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(zyxly::config))]
    Config { message: String },

    // ── Internal / IO ────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(zyxly::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::InvalidResponse { .. } => exit_code::INVALID_RESPONSE,
            Self::Validation { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. }
            | Self::NoConfig { .. }
            | Self::Config { .. }
            | Self::Internal(_)
            | Self::Io(_) => exit_code::GENERAL,
        }
    }

    fn from_kind(kind: ErrorKind, message: String) -> Self {
        match kind {
            ErrorKind::Connection => CliError::ConnectionFailed { reason: message },
            ErrorKind::Authentication => CliError::AuthFailed { message },
            ErrorKind::InvalidResponse => CliError::InvalidResponse { message },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed {
                reason,
                timed_out: true,
                ..
            } => CliError::Timeout { reason },
            CoreError::ConnectionFailed { reason, .. } => CliError::ConnectionFailed { reason },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::InvalidResponse { message, .. } => CliError::InvalidResponse { message },
            CoreError::UpdateFailed { message, kind } => CliError::from_kind(kind, message),
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
