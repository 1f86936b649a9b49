// Router login
//
// `POST /UserLogin` with the account and base64 password. On success the
// router sets a session cookie that the shared cookie store picks up;
// every later DAL query rides on it.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use super::SUCCESS_SENTINEL;
use super::client::RouterClient;
use super::models::{LoginReply, parse_body};
use crate::auth::LoginPayload;
use crate::error::Error;

impl RouterClient {
    /// Authenticate and refresh the session cookie.
    ///
    /// - transport failure → `Connection`
    /// - HTTP 401, or a `result` of any type other than the string
    ///   `ZCFG_SUCCESS` → `Authentication`
    /// - any other non-2xx status, an undecodable body, or a body without
    ///   `result` → `InvalidResponse`
    pub async fn login(&self) -> Result<(), Error> {
        let url = self.login_url();
        debug!(%url, account = self.credentials().username(), "logging in");

        let payload = LoginPayload::new(self.credentials());
        let resp = self
            .http()
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::transport("login request failed", e))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "credentials incorrect".into(),
            });
        }
        if !status.is_success() {
            return Err(Error::InvalidResponse {
                message: format!("unexpected login status (HTTP {status})"),
                status: Some(status.as_u16()),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::transport("failed to read login response", e))?;
        let reply: LoginReply = parse_body(&body, "login response")?;

        match reply.result {
            Some(Value::String(ref result)) if result == SUCCESS_SENTINEL => {
                debug!("login successful");
                Ok(())
            }
            Some(result) => {
                let other = match result {
                    Value::String(text) => text,
                    value => value.to_string(),
                };
                Err(Error::Authentication {
                    message: match reply.reply_msg.as_deref() {
                        Some(msg) if !msg.is_empty() => format!("login failed: {other} ({msg})"),
                        _ => format!("login failed: {other}"),
                    },
                })
            }
            None => Err(Error::InvalidResponse {
                message: "key \"result\" not set in login response".into(),
                status: Some(status.as_u16()),
            }),
        }
    }
}
