//! Clap derive structures for the `zyxly` CLI.
//!
//! Defines the command tree, global flags, and shared types. Only depends
//! on clap, clap_complete and humantime so `build.rs` can include it.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// zyxly -- poll a Zyxel 5G router for signal, traffic and device data
#[derive(Debug, Parser)]
#[command(
    name = "zyxly",
    version,
    about = "Read signal, traffic and device telemetry from Zyxel 5G routers",
    long_about = "Logs in to the router's web management API, queries its DAL objects\n\
        and renders the results as sensors, raw objects or a device summary.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Router profile to use
    #[arg(long, short = 'p', env = "ZYXLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Router IP, host name or URL (overrides profile)
    #[arg(long, short = 'e', env = "ZYXLY_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Router account (overrides profile)
    #[arg(long, short = 'u', env = "ZYXLY_USERNAME", global = true)]
    pub username: Option<String>,

    /// Router password
    #[arg(long, env = "ZYXLY_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ZYXLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates even if the profile verifies them
    #[arg(long, short = 'k', env = "ZYXLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "ZYXLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the router accepts the configured credentials
    Login,

    /// Fetch one raw DAL object (e.g. status, lanhosts, Traffic_Status)
    #[command(alias = "q")]
    Query(QueryArgs),

    /// Run one poll cycle and show the outcome per endpoint
    #[command(alias = "st")]
    Status,

    /// Run one poll cycle and show sensor values
    #[command(alias = "s")]
    Sensors(SensorsArgs),

    /// Show router model, firmware and serial number
    #[command(alias = "dev")]
    Device,

    /// Read a single value by path from one poll cycle
    Get(GetArgs),

    /// Poll continuously and print sensors after every cycle
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DATA COMMANDS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Object identifier passed as `?oid=`
    pub oid: String,
}

#[derive(Debug, Args)]
pub struct SensorsArgs {
    /// Include sensors that are disabled by default
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Object identifier the value lives in
    pub oid: String,

    /// Path segments; dotted paths are split (`ipIfaceSt.0.BytesSent`)
    #[arg(required = true)]
    pub path: Vec<String>,

    /// Value printed when the path does not resolve (parsed as JSON, else text)
    #[arg(long, short = 'd')]
    pub default: Option<String>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Time between cycles (30s to 1h, e.g. "90s", "5m"); overrides profile
    #[arg(long, short = 'i', value_parser = parse_interval)]
    pub interval: Option<Duration>,

    /// Include sensors that are disabled by default
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Parse a human duration ("60", "90s", "5m").
pub fn parse_interval(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(raw).map_err(|e| format!("invalid interval '{raw}': {e}"))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (endpoint, username, password_env, ca_cert,
        /// verify_tls, timeout, poll_interval, endpoints)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the router password in the system keyring (uses --profile)
    SetPassword,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
