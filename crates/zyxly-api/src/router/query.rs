// DAL queries
//
// `GET /cgi-bin/DAL?oid={oid}`. The response shape behind the envelope is
// vendor-defined and varies by firmware, so results stay loosely typed.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, trace};

use super::client::RouterClient;
use super::models::{DalEnvelope, parse_body};
use crate::error::Error;

impl RouterClient {
    /// Fetch the object selected by `oid`.
    ///
    /// Bounded by the client's query timeout; when it elapses the in-flight
    /// request is dropped and the call fails with a `Connection` error.
    /// HTTP 401 means the session expired: the caller decides whether to
    /// log in again, nothing is retried here.
    pub async fn query(&self, oid: &str) -> Result<Value, Error> {
        let limit = self.query_timeout();
        match tokio::time::timeout(limit, self.query_once(oid)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(oid, timeout_ms = limit.as_millis(), "query timed out");
                Err(Error::timeout(limit))
            }
        }
    }

    async fn query_once(&self, oid: &str) -> Result<Value, Error> {
        let url = self.query_url();
        debug!(%url, oid, "GET");

        let resp = self
            .http()
            .get(url)
            .query(&[("oid", oid)])
            .send()
            .await
            .map_err(|e| Error::transport(&format!("query for '{oid}' failed"), e))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or not logged in".into(),
            });
        }
        if !status.is_success() {
            return Err(Error::Connection {
                message: format!("error retrieving '{oid}' (HTTP {status})"),
                status: Some(status.as_u16()),
                timed_out: false,
                source: None,
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::transport(&format!("failed to read '{oid}' response"), e))?;
        trace!(oid, bytes = body.len(), "query response received");

        let envelope: DalEnvelope = parse_body(&body, &format!("'{oid}' response"))?;
        envelope.into_first_object(oid).map_err(|e| match e {
            Error::InvalidResponse { message, .. } => Error::InvalidResponse {
                message,
                status: Some(status.as_u16()),
            },
            other => other,
        })
    }
}
