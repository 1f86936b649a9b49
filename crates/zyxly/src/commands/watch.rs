//! Continuous polling with per-cycle sensor output.

use chrono::{Local, SecondsFormat};
use serde::Serialize;

use zyxly_core::config::validate_poll_interval;
use zyxly_core::{
    Coordinator, ErrorKind, RouterConfig, RouterData, SensorReading, UpdateStatus, read_sensors,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::sensors;

/// One line of `--output json` watch output.
#[derive(Serialize)]
struct Cycle<'a> {
    taken_at: String,
    failed_endpoints: usize,
    sensors: &'a [SensorReading],
}

/// `--output json` line for a cycle that failed.
#[derive(Serialize)]
struct Unavailable<'a> {
    available: bool,
    attempted_at: Option<String>,
    error: Option<&'a str>,
    kind: Option<ErrorKind>,
    consecutive_failures: u32,
}

/// Output for a failed cycle. The last published readings are stale from
/// here on, so say so instead of repeating them.
fn render_unavailable(status: &UpdateStatus, global: &GlobalOpts) -> Result<String, CliError> {
    let error = status.last_error.as_deref();
    match global.output {
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(
            &Unavailable {
                available: false,
                attempted_at: status
                    .last_attempt
                    .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
                error,
                kind: status.last_error_kind,
                consecutive_failures: status.consecutive_failures,
            },
            true,
        ),
        OutputFormat::Table | OutputFormat::Yaml | OutputFormat::Plain => {
            let stamp = status.last_attempt.map_or_else(String::new, |t| {
                format!("{} ", t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"))
            });
            Ok(format!(
                "{stamp}router unavailable ({} failed): {}",
                status.consecutive_failures,
                error.unwrap_or("update failed")
            ))
        }
    }
}

fn render_cycle(data: &RouterData, args: &WatchArgs, global: &GlobalOpts) -> Result<String, CliError> {
    let snapshot = &data.snapshot;
    let readings = sensors::select(read_sensors(snapshot), args.all);

    match global.output {
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(
            &Cycle {
                taken_at: snapshot.taken_at().to_rfc3339_opts(SecondsFormat::Secs, true),
                failed_endpoints: snapshot.failed_count(),
                sensors: &readings,
            },
            true,
        ),
        OutputFormat::Table => {
            let stamp = snapshot
                .taken_at()
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S");
            let table = sensors::render(&readings, global)?;
            Ok(format!("{stamp}\n{table}"))
        }
        OutputFormat::Yaml | OutputFormat::Plain => sensors::render(&readings, global),
    }
}

pub async fn handle(
    mut config: RouterConfig,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(interval) = args.interval {
        config.poll_interval =
            validate_poll_interval(interval).map_err(|e| CliError::Validation {
                field: "interval".into(),
                reason: e.to_string(),
            })?;
    }

    let coordinator = Coordinator::new(config)?;
    // Subscribe first so the poll task sees interest from its first tick.
    let mut stream = coordinator.subscribe();
    let mut status = coordinator.subscribe_status();
    coordinator.start().await?;
    let mut reported_failures = status.borrow_and_update().consecutive_failures;

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            changed = status.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let current = status.borrow_and_update().clone();
                let new_failure = current.consecutive_failures > reported_failures;
                reported_failures = current.consecutive_failures;
                if !new_failure {
                    continue;
                }
                match render_unavailable(&current, global) {
                    Ok(out) => output::print_output(&out, global.quiet),
                    Err(e) => break Err(e),
                }
            }
            data = stream.changed() => {
                let Some(data) = data else { break Ok(()) };
                match render_cycle(&data, args, global) {
                    Ok(out) => output::print_output(&out, global.quiet),
                    Err(e) => break Err(e),
                }
            }
        }
    };

    coordinator.shutdown().await;
    result
}
