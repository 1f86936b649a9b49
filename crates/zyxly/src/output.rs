//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one line per item.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use bytesize::ByteSize;
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use zyxly_core::SensorReading;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Green "ok" / red "failed" marker for status columns.
pub fn status_marker(ok: bool, color: bool) -> String {
    match (ok, color) {
        (true, true) => "ok".green().to_string(),
        (false, true) => "failed".red().to_string(),
        (true, false) => "ok".into(),
        (false, false) => "failed".into(),
    }
}

/// Print a one-line success message to stderr unless quiet.
pub fn print_success(message: &str, color: bool, quiet: bool) {
    if quiet {
        return;
    }
    if color {
        eprintln!("{} {message}", "✓".green().bold());
    } else {
        eprintln!("{message}");
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    plain_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&plain_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views are key/value
/// listings rather than rows.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    plain_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(plain_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Aligned `key: value` lines for detail views.
pub fn render_detail(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| format!("{k:<width$}  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(
    data: &T,
    compact: bool,
) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Internal(format!("JSON serialization failed: {e}")))
}

pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data)
        .map(|s| s.trim_end().to_owned())
        .map_err(|e| CliError::Internal(format!("YAML serialization failed: {e}")))
}

// ── Value formatting ─────────────────────────────────────────────────

/// Human-readable sensor value with its unit.
pub fn format_reading(reading: &SensorReading) -> String {
    let Some(ref value) = reading.value else {
        return "unavailable".into();
    };
    match (reading.unit, value.as_i64()) {
        (Some("B"), Some(bytes)) => u64::try_from(bytes)
            .map_or_else(|_| format!("{bytes} B"), |b| ByteSize::b(b).to_string()),
        (Some("s"), Some(secs)) => u64::try_from(secs).map_or_else(
            |_| format!("{secs} s"),
            |s| humantime::format_duration(Duration::from_secs(s)).to_string(),
        ),
        (Some(unit), _) => format!("{value} {unit}"),
        (None, _) => value.to_string(),
    }
}

/// Raw `key=value` form for plain output.
pub fn plain_reading(reading: &SensorReading) -> String {
    match reading.value {
        Some(ref v) => format!("{}={v}", reading.key),
        None => format!("{}=", reading.key),
    }
}

#[cfg(test)]
mod tests {
    use zyxly_core::SensorValue;

    use super::*;

    fn reading(key: &'static str, unit: Option<&'static str>, value: Option<SensorValue>) -> SensorReading {
        SensorReading {
            key,
            name: key,
            available: value.is_some(),
            value,
            unit,
            enabled_by_default: true,
        }
    }

    #[test]
    fn byte_and_duration_readings_are_humanized() {
        let sent = reading("wan_bytes_sent", Some("B"), Some(SensorValue::Integer(2048)));
        assert_eq!(format_reading(&sent), ByteSize::b(2048).to_string());

        let uptime = reading("uptime", Some("s"), Some(SensorValue::Integer(3_661)));
        assert_eq!(format_reading(&uptime), "1h 1m 1s");

        let rssi = reading("rssi", Some("dBm"), Some(SensorValue::Integer(-71)));
        assert_eq!(format_reading(&rssi), "-71 dBm");
    }

    #[test]
    fn missing_reading_renders_as_unavailable() {
        let band = reading("network_band", None, None);
        assert_eq!(format_reading(&band), "unavailable");
        assert_eq!(plain_reading(&band), "network_band=");

        let tech = reading("network_technology", None, Some(SensorValue::Text("NR5G-NSA".into())));
        assert_eq!(plain_reading(&tech), "network_technology=NR5G-NSA");
    }

    #[test]
    fn detail_keys_are_aligned() {
        let out = render_detail(&[("Model", "NR7101".into()), ("Serial", "S1".into())]);
        assert_eq!(out, "Model   NR7101\nSerial  S1");
    }
}
