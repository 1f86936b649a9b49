// Router API HTTP client
//
// Wraps `reqwest::Client` with router URL construction and session
// bookkeeping. Login and query are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use url::Url;

use super::{LOGIN_PATH, QUERY_PATH};
use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::{DEFAULT_QUERY_TIMEOUT, SessionCookies, TransportConfig};

/// HTTP client for a single router.
///
/// Never retries: every `login()` and `query()` is exactly one request.
/// Cheap to clone; clones share the HTTP connection pool and the session.
#[derive(Debug, Clone)]
pub struct RouterClient {
    http: reqwest::Client,
    credentials: Credentials,
    query_timeout: Duration,
    /// Session cookie store, shared with `http`. `None` when the client was
    /// built around an externally supplied `reqwest::Client`.
    cookies: Option<Arc<SessionCookies>>,
}

impl RouterClient {
    /// Create a client with its own session cookie store.
    pub fn new(credentials: Credentials, transport: &TransportConfig) -> Result<Self, Error> {
        let cookies = Arc::new(SessionCookies::new());
        let http = transport.build_client(Arc::clone(&cookies))?;
        debug!(endpoint = %credentials.endpoint(), "router client created");
        Ok(Self {
            http,
            credentials,
            query_timeout: transport.query_timeout,
            cookies: Some(cookies),
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// The caller owns cookie handling; [`has_session`](Self::has_session)
    /// always reports `false` and [`clear_session`](Self::clear_session)
    /// is a no-op.
    pub fn with_client(http: reqwest::Client, credentials: Credentials) -> Self {
        Self {
            http,
            credentials,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            cookies: None,
        }
    }

    /// Override the per-query deadline.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The router base URL.
    pub fn base_url(&self) -> &Url {
        self.credentials.endpoint()
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Stable identifier derived from the router host (`192_168_1_1`).
    pub fn router_name(&self) -> String {
        self.base_url()
            .host_str()
            .unwrap_or_default()
            .replace('.', "_")
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Whether a session cookie is currently held for the router.
    pub fn has_session(&self) -> bool {
        self.cookies
            .as_ref()
            .and_then(|c| c.header_for(self.base_url()))
            .is_some()
    }

    /// Discard the session cookie. The next query fails with
    /// `Authentication` until `login()` succeeds again.
    pub fn clear_session(&self) {
        if let Some(ref cookies) = self.cookies {
            debug!("discarding router session");
            cookies.clear();
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn path_url(&self, path: &str) -> Url {
        let mut url = self.base_url().clone();
        url.set_path(path);
        url.set_query(None);
        url
    }

    pub(crate) fn login_url(&self) -> Url {
        self.path_url(LOGIN_PATH)
    }

    pub(crate) fn query_url(&self) -> Url {
        self.path_url(QUERY_PATH)
    }
}
