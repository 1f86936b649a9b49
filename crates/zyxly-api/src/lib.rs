// zyxly-api: Async Rust client for the Zyxel 5G router management API

pub mod auth;
pub mod error;
pub mod router;
pub mod transport;

pub use auth::{Credentials, router_url};
pub use error::{Error, ErrorKind};
pub use router::RouterClient;
pub use transport::{SessionCookies, TlsMode, TransportConfig};
