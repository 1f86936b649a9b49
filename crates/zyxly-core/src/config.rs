// ── Runtime router configuration ──
//
// Describes *how* to reach one router and how often to poll it. Carries
// credentials and tuning but never touches disk: the CLI builds a
// `RouterConfig` from its profile and hands it to the `Coordinator`.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;
use zyxly_api::{Credentials, TlsMode, TransportConfig};

use crate::error::CoreError;
use crate::model::Endpoint;

/// Default IP address of the router on its own LAN.
pub const DEFAULT_HOST: &str = "192.168.1.1";
/// Default administrator account.
pub const DEFAULT_USERNAME: &str = "admin";

/// Poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
/// Shortest accepted poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(30);
/// Longest accepted poll interval.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(3600);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Routers ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for polling a single router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Router base URL (e.g. `https://192.168.1.1`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Overall HTTP request timeout (login included).
    pub timeout: Duration,
    /// Deadline for each individual query.
    pub query_timeout: Duration,
    /// Time between poll cycles, within
    /// [`MIN_POLL_INTERVAL`]..=[`MAX_POLL_INTERVAL`].
    pub poll_interval: Duration,
    /// Oids queried every cycle. Duplicates are ignored.
    pub endpoints: Vec<String>,
}

impl RouterConfig {
    /// Config with default tuning and the full known endpoint set.
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        let transport = TransportConfig::default();
        Self {
            url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: transport.timeout,
            query_timeout: transport.query_timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
            endpoints: Endpoint::default_oids(),
        }
    }

    /// Check the invariants the coordinator relies on.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_poll_interval(self.poll_interval)?;
        if self.endpoints.is_empty() {
            return Err(CoreError::Config {
                message: "at least one endpoint must be polled".into(),
            });
        }
        if let Some(blank) = self.endpoints.iter().find(|oid| oid.trim().is_empty()) {
            return Err(CoreError::Config {
                message: format!("invalid endpoint oid {blank:?}"),
            });
        }
        if self.query_timeout.is_zero() || self.timeout.is_zero() {
            return Err(CoreError::Config {
                message: "timeouts must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub(crate) fn credentials(&self) -> Credentials {
        Credentials::new(self.url.clone(), self.username.clone(), self.password.clone())
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
            query_timeout: self.query_timeout,
        }
    }
}

/// Reject poll intervals outside the supported range.
pub fn validate_poll_interval(interval: Duration) -> Result<Duration, CoreError> {
    if (MIN_POLL_INTERVAL..=MAX_POLL_INTERVAL).contains(&interval) {
        Ok(interval)
    } else {
        Err(CoreError::Config {
            message: format!(
                "poll interval must be between {}s and {}s, got {}s",
                MIN_POLL_INTERVAL.as_secs(),
                MAX_POLL_INTERVAL.as_secs(),
                interval.as_secs()
            ),
        })
    }
}
