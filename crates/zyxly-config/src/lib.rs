//! Shared configuration for zyxly.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `zyxly_core::RouterConfig`. The CLI adds
//! `GlobalOpts`-aware wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use zyxly_core::config::{DEFAULT_HOST, DEFAULT_POLL_INTERVAL, DEFAULT_USERNAME, validate_poll_interval};
use zyxly_core::{RouterConfig, TlsVerification};

/// Keyring service name; entries are keyed `{profile}/password`.
pub const KEYRING_SERVICE: &str = "zyxly";
/// Prefix for environment overrides (`ZYXLY_DEFAULTS__TIMEOUT=60`).
pub const ENV_PREFIX: &str = "ZYXLY_";
/// Environment variable consulted first for the router password.
pub const PASSWORD_ENV: &str = "ZYXLY_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named router profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between poll cycles for `watch`.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

/// A named router profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Router IP, host name or base URL (e.g. "192.168.1.1").
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_username")]
    pub username: String,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Verify the router certificate against the system store. Off by
    /// default: routers ship self-signed certificates.
    pub verify_tls: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override poll interval (seconds, 30..=3600).
    pub poll_interval: Option<u64>,

    /// Oids to poll. Defaults to every known endpoint.
    pub endpoints: Option<Vec<String>>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            username: default_username(),
            password: None,
            password_env: None,
            ca_cert: None,
            verify_tls: None,
            timeout: None,
            poll_interval: None,
            endpoints: None,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_HOST.into()
}
fn default_username() -> String {
    DEFAULT_USERNAME.into()
}

impl Config {
    /// Name of the profile used when none is requested.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "zyxly", "zyxly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("zyxly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if it exists), then `ZYXLY_` env vars.
///
/// Nested keys use a double underscore: `ZYXLY_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Resolve the router password without CLI flags.
///
/// Order: the profile's `password_env`, `ZYXLY_PASSWORD`, the system
/// keyring, then plaintext in the config file.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Env vars
    let env_names = profile.password_env.as_deref().into_iter().chain([PASSWORD_ENV]);
    for name in env_names {
        if let Ok(pw) = std::env::var(name) {
            return Ok(SecretString::from(pw));
        }
    }

    // 2. Keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a password in the system keyring for `profile_name`.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Parse the profile's endpoint into a router base URL.
pub fn profile_url(profile: &Profile) -> Result<url::Url, ConfigError> {
    zyxly_api::router_url(&profile.endpoint).map_err(|e| ConfigError::Validation {
        field: "endpoint".into(),
        reason: format!("{e}: {}", profile.endpoint),
    })
}

/// TLS mode for a profile: a CA file wins, then `verify_tls`, else
/// self-signed certificates are accepted.
pub fn profile_tls(profile: &Profile) -> TlsVerification {
    if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else if profile.verify_tls.unwrap_or(false) {
        TlsVerification::SystemDefaults
    } else {
        TlsVerification::DangerAcceptInvalid
    }
}

/// Check a poll interval in seconds against the supported range.
pub fn poll_interval(secs: u64) -> Result<Duration, ConfigError> {
    validate_poll_interval(Duration::from_secs(secs)).map_err(|e| ConfigError::Validation {
        field: "poll_interval".into(),
        reason: e.to_string(),
    })
}

/// Build a `RouterConfig` from a profile and global defaults, without CLI
/// flag overrides.
pub fn profile_to_router_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<RouterConfig, ConfigError> {
    let url = profile_url(profile)?;
    let password = resolve_password(profile, profile_name)?;

    let mut config = RouterConfig::new(url, profile.username.clone(), password);
    config.tls = profile_tls(profile);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.poll_interval = poll_interval(profile.poll_interval.unwrap_or(defaults.poll_interval))?;
    if let Some(ref endpoints) = profile.endpoints {
        config.endpoints.clone_from(endpoints);
    }

    config.validate().map_err(|e| ConfigError::Validation {
        field: format!("profile '{profile_name}'"),
        reason: e.to_string(),
    })?;
    Ok(config)
}
