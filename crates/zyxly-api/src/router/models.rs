// Response envelopes for the router's management API.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::SUCCESS_SENTINEL;
use crate::error::Error;

/// Body returned by `POST /UserLogin`.
///
/// Only `result` carries meaning; everything else varies by firmware.
/// `result` is kept untyped since some firmware answers with a number.
#[derive(Debug, Deserialize)]
pub struct LoginReply {
    pub result: Option<Value>,
    #[serde(rename = "ReplyMsg")]
    pub reply_msg: Option<String>,
}

/// Body returned by `GET /cgi-bin/DAL?oid=...`.
#[derive(Debug, Deserialize)]
pub struct DalEnvelope {
    pub result: Option<String>,
    #[serde(rename = "ReplyMsg")]
    pub reply_msg: Option<String>,
    #[serde(rename = "Object")]
    pub object: Option<Vec<Value>>,
}

impl DalEnvelope {
    /// Validate the envelope and unwrap the first object.
    ///
    /// An empty `Object` list yields an empty mapping, not an error.
    pub fn into_first_object(self, oid: &str) -> Result<Value, Error> {
        match self.result.as_deref() {
            Some(SUCCESS_SENTINEL) => {}
            Some(other) => {
                return Err(Error::InvalidResponse {
                    message: format!(
                        "query for '{oid}' returned {other}{}",
                        reply_suffix(self.reply_msg.as_deref())
                    ),
                    status: None,
                });
            }
            None => {
                return Err(Error::InvalidResponse {
                    message: format!("key \"result\" not set in response for '{oid}'"),
                    status: None,
                });
            }
        }

        let objects = self.object.ok_or_else(|| Error::InvalidResponse {
            message: format!("key \"Object\" not set in response for '{oid}'"),
            status: None,
        })?;

        Ok(objects
            .into_iter()
            .next()
            .unwrap_or_else(|| Value::Object(Map::new())))
    }
}

fn reply_suffix(reply_msg: Option<&str>) -> String {
    match reply_msg {
        Some(msg) if !msg.is_empty() => format!(" ({msg})"),
        _ => String::new(),
    }
}

/// Parse a JSON body, turning any decode failure into `InvalidResponse`.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::InvalidResponse {
            message: format!("unable to decode {context}: {e} (body preview: {preview:?})"),
            status: None,
        }
    })
}
