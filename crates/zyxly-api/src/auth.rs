// Router credentials and the login payload.
//
// The router expects the password base64-encoded inside a JSON body.
// That encoding is the vendor's wire format, not a protection: the
// secret is kept in a `SecretString` until the moment it is serialized.

use base64::prelude::*;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;

/// Scheme used when the configured endpoint is a bare IP or host name.
pub const DEFAULT_SCHEME: &str = "https";

/// Credentials for one router. Immutable for the lifetime of a client.
#[derive(Debug, Clone)]
pub struct Credentials {
    endpoint: Url,
    username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(endpoint: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            endpoint,
            username: username.into(),
            password,
        }
    }

    /// Router base URL, e.g. `https://192.168.1.1`.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

/// Turn a configured endpoint into the router base URL.
///
/// Accepts a bare IP or host (`192.168.1.1`, `router.lan:8443`), which gets
/// the default `https` scheme, or a full URL that is used as given.
///
/// The scheme is detected before trailing slashes are stripped, and a URL
/// without a host is rejected.
pub fn router_url(endpoint: &str) -> Result<Url, url::ParseError> {
    let endpoint = endpoint.trim();
    let url = if endpoint.contains("://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!(
            "{DEFAULT_SCHEME}://{}",
            endpoint.trim_end_matches('/')
        ))?
    };
    if url.host_str().is_none_or(str::is_empty) {
        return Err(url::ParseError::EmptyHost);
    }
    Ok(url)
}

/// Body of `POST /UserLogin`.
///
/// Deliberately not `Debug`: the encoded password is trivially reversible.
#[derive(Serialize)]
pub(crate) struct LoginPayload<'a> {
    #[serde(rename = "Input_Account")]
    account: &'a str,
    #[serde(rename = "Input_Passwd")]
    password: String,
    #[serde(rename = "currLang")]
    language: &'static str,
    #[serde(rename = "RememberPassword")]
    remember_password: u8,
    #[serde(rename = "SHA512_password")]
    sha512_password: bool,
}

impl<'a> LoginPayload<'a> {
    pub(crate) fn new(credentials: &'a Credentials) -> Self {
        Self {
            account: credentials.username(),
            password: encode_password(credentials.password()),
            language: "en",
            remember_password: 0,
            sha512_password: false,
        }
    }
}

/// Standard base64 of the UTF-8 password bytes.
pub(crate) fn encode_password(password: &SecretString) -> String {
    BASE64_STANDARD.encode(password.expose_secret().as_bytes())
}
