//! CLI configuration: thin wrapper around `zyxly_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--endpoint, --username, --password, --insecure, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use zyxly_core::{RouterConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use zyxly_config::{
    Config, Profile, config_path, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Build the `RouterConfig` for a command that talks to the router.
///
/// Flags override the active profile. Without a stored profile the
/// router address must come from `--endpoint`.
pub fn build_router_config(global: &GlobalOpts) -> Result<RouterConfig, CliError> {
    let config = load_config_or_default();
    let profile_name = active_profile_name(global, &config);

    let stored = match config.profile(&profile_name) {
        Ok(profile) => Some(profile.clone()),
        Err(_) if global.profile.is_none() && global.endpoint.is_some() => None,
        Err(_) if config.profiles.is_empty() && global.profile.is_none() => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
        Err(_) => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&config),
            });
        }
    };

    resolve_profile(
        stored.unwrap_or_default(),
        &profile_name,
        &config.defaults,
        global,
    )
}

/// Translate a `Profile` + global flags into a `RouterConfig`.
fn resolve_profile(
    mut profile: Profile,
    profile_name: &str,
    defaults: &zyxly_config::Defaults,
    global: &GlobalOpts,
) -> Result<RouterConfig, CliError> {
    // 1. Router address and account (flag > env > profile)
    if let Some(ref endpoint) = global.endpoint {
        profile.endpoint.clone_from(endpoint);
    }
    if let Some(ref username) = global.username {
        profile.username.clone_from(username);
    }
    let url = zyxly_config::profile_url(&profile)?;

    // 2. Password (flag > env > keyring > plaintext)
    let password = match global.password {
        Some(ref pw) => SecretString::from(pw.clone()),
        None => zyxly_config::resolve_password(&profile, profile_name)?,
    };

    let mut router = RouterConfig::new(url, profile.username.clone(), password);

    // 3. TLS verification
    router.tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        zyxly_config::profile_tls(&profile)
    };

    // 4. Timeouts and cadence
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(defaults.timeout);
    router.timeout = Duration::from_secs(timeout);
    if router.query_timeout > router.timeout {
        router.query_timeout = router.timeout;
    }
    router.poll_interval =
        zyxly_config::poll_interval(profile.poll_interval.unwrap_or(defaults.poll_interval))?;
    if let Some(endpoints) = profile.endpoints {
        router.endpoints = endpoints;
    }

    router.validate()?;
    Ok(router)
}

/// Comma-separated profile names, or a placeholder when there are none.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config
            .profiles
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
