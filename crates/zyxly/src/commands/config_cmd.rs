//! Config subcommand handlers.

use std::collections::BTreeMap;

use dialoguer::{Confirm, Input, Select};

use zyxly_config::Defaults;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "poll_interval = {}", cfg.defaults.poll_interval);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "endpoint = \"{}\"", p.endpoint);
        let _ = writeln!(out, "username = \"{}\"", p.username);
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"{REDACTED}\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(verify) = p.verify_tls {
            let _ = writeln!(out, "verify_tls = {verify}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(interval) = p.poll_interval {
            let _ = writeln!(out, "poll_interval = {interval}");
        }
        if let Some(ref endpoints) = p.endpoints {
            let quoted: Vec<_> = endpoints.iter().map(|e| format!("\"{e}\"")).collect();
            let _ = writeln!(out, "endpoints = [{}]", quoted.join(", "));
        }
    }

    out.trim_end().to_owned()
}

/// Delegate to the shared config crate's save function.
fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Read a non-empty password from the terminal without echo.
fn prompt_password() -> Result<String, CliError> {
    let pass = rpassword::prompt_password("Router password: ").map_err(prompt_err)?;
    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(pass)
}

/// Offer to store the password in the system keyring.
///
/// Returns `Some(password)` if the user chose plaintext, `None` if stored
/// in the keyring.
fn prompt_keyring_storage(password: String, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        zyxly_config::store_password(profile_name, &password)?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(password))
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expected}, got '{value}'"),
    })
}

/// Apply `key = value` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "endpoint" => {
            let mut candidate = profile.clone();
            candidate.endpoint.clone_from(&value);
            zyxly_config::profile_url(&candidate)?;
            profile.endpoint = value;
        }
        "username" => profile.username = value,
        "password_env" | "password-env" => profile.password_env = Some(value),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "verify_tls" | "verify-tls" => {
            profile.verify_tls = Some(parse_field("verify_tls", &value, "'true' or 'false'")?);
        }
        "timeout" => {
            let secs: u64 = parse_field("timeout", &value, "a number of seconds")?;
            if secs == 0 {
                return Err(CliError::Validation {
                    field: "timeout".into(),
                    reason: "must be greater than zero".into(),
                });
            }
            profile.timeout = Some(secs);
        }
        "poll_interval" | "poll-interval" => {
            let secs = parse_field("poll_interval", &value, "a number of seconds")?;
            zyxly_config::poll_interval(secs)?;
            profile.poll_interval = Some(secs);
        }
        "endpoints" => {
            let oids: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
            if oids.is_empty() {
                return Err(CliError::Validation {
                    field: "endpoints".into(),
                    reason: "expected a comma-separated list of oids".into(),
                });
            }
            profile.endpoints = Some(oids);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: endpoint, username, \
                     password_env, ca_cert, verify_tls, timeout, poll_interval, endpoints"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default();
            for profile in cfg.profiles.values_mut() {
                if profile.password.is_some() {
                    profile.password = Some(REDACTED.into());
                }
            }
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            set_profile_key(profile, &key, value)?;

            save_config(&cfg)?;
            let color = output::should_color(&global.color);
            output::print_success(&format!("Set {key} on profile '{profile_name}'"), color, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile_name();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: zyxly config init");
            } else {
                for (name, profile) in &cfg.profiles {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}\t{}", profile.endpoint);
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: config::available_profiles(&cfg),
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            let color = output::should_color(&global.color);
            output::print_success(&format!("Default profile set to '{name}'"), color, global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }

            let password = prompt_password()?;
            zyxly_config::store_password(&profile_name, &password)?;

            let color = output::should_color(&global.color);
            output::print_success(
                &format!("Password stored in system keyring for profile '{profile_name}'"),
                color,
                global.quiet,
            );
            Ok(())
        }
    }
}

/// Interactive wizard writing a fresh config with one profile.
fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("zyxly configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    if config_path.exists() {
        let overwrite = Confirm::new()
            .with_prompt("A config file already exists. Overwrite it?")
            .default(false)
            .interact()
            .map_err(prompt_err)?;
        if !overwrite {
            eprintln!("Aborted; existing configuration kept.");
            return Ok(());
        }
    }

    // 1. Profile name
    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    // 2. Router address
    let endpoint: String = Input::new()
        .with_prompt("Router address")
        .default(zyxly_core::config::DEFAULT_HOST.into())
        .interact_text()
        .map_err(prompt_err)?;

    // 3. Account
    let username: String = Input::new()
        .with_prompt("Username")
        .default(zyxly_core::config::DEFAULT_USERNAME.into())
        .interact_text()
        .map_err(prompt_err)?;

    // 4. Password
    let password = prompt_password()?;
    let password = prompt_keyring_storage(password, &profile_name)?;

    // 5. Build profile and config
    let profile = Profile {
        endpoint,
        username,
        password,
        ..Profile::default()
    };
    zyxly_config::profile_url(&profile)?;

    let mut profiles = BTreeMap::new();
    profiles.insert(profile_name.clone(), profile);

    let cfg = Config {
        default_profile: Some(profile_name.clone()),
        defaults: Defaults::default(),
        profiles,
    };

    // 6. Write config
    save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: zyxly login");

    Ok(())
}
