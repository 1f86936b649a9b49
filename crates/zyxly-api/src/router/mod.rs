// Router management API
//
// `POST /UserLogin` issues a session cookie; `GET /cgi-bin/DAL?oid=...`
// returns one data object per oid, wrapped in a `{result, Object}` envelope.

pub mod client;
pub mod login;
pub mod models;
pub mod query;

pub use client::RouterClient;

/// Login endpoint path.
pub const LOGIN_PATH: &str = "/UserLogin";

/// Generic data-access endpoint path. The `oid` query parameter selects the object.
pub const QUERY_PATH: &str = "/cgi-bin/DAL";

/// `result` value marking a successful envelope.
pub const SUCCESS_SENTINEL: &str = "ZCFG_SUCCESS";
