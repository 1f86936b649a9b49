// Transport configuration and session cookie storage.
//
// The router hands out its session as a cookie on `/UserLogin`. The
// cookie store lives behind an `Arc` shared with the `reqwest::Client`, so
// every concurrent query in a poll cycle reuses the same session, and
// teardown can discard it without rebuilding the HTTP client.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use url::Url;

use crate::error::Error;

/// Deadline for a single DAL query.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall per-request timeout applied by the HTTP client (login included).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate. Consumer routers ship self-signed ones.
    #[default]
    DangerAcceptInvalid,
}

/// Shared transport configuration for building the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub query_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::default(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` that stores cookies in `cookies`.
    pub fn build_client(&self, cookies: Arc<SessionCookies>) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("zyxly/", env!("CARGO_PKG_VERSION")))
            .cookie_provider(cookies);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path).map_err(|e| Error::Connection {
                    message: format!("failed to read CA cert {}: {e}", path.display()),
                    status: None,
                    timed_out: false,
                    source: None,
                })?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::transport("invalid CA cert", e))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::transport("failed to build HTTP client", e))
    }
}

/// Resettable cookie store holding the router session.
///
/// Delegates to a `reqwest` [`Jar`] that can be swapped for an empty one,
/// which is how a session is discarded on teardown.
#[derive(Debug, Default)]
pub struct SessionCookies {
    jar: RwLock<Arc<Jar>>,
}

impl SessionCookies {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> Arc<Jar> {
        Arc::clone(&self.jar.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Drop every stored cookie.
    pub fn clear(&self) {
        *self.jar.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(Jar::default());
    }

    /// The `Cookie` header that would be sent to `url`, if any.
    pub fn header_for(&self, url: &Url) -> Option<String> {
        let value = self.current().cookies(url)?;
        value.to_str().ok().map(String::from)
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.current().set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.current().cookies(url)
    }
}
