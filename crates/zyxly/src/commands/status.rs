//! One poll cycle, summarized per endpoint.

use serde::Serialize;
use tabled::Tabled;

use zyxly_core::{Coordinator, Endpoint, EndpointResult, ErrorKind, RouterConfig, Snapshot};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct EndpointStatus {
    oid: String,
    label: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Endpoint")]
    label: String,
    #[tabled(rename = "OID")]
    oid: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

fn summarize(snapshot: &Snapshot) -> Vec<EndpointStatus> {
    snapshot
        .iter()
        .map(|(oid, result)| {
            let label = Endpoint::from_oid(oid).map_or_else(|| oid.to_owned(), |e| e.label().to_owned());
            match result {
                EndpointResult::Ok(_) => EndpointStatus {
                    oid: oid.to_owned(),
                    label,
                    ok: true,
                    error_kind: None,
                    error: None,
                },
                EndpointResult::Failed(failure) => EndpointStatus {
                    oid: oid.to_owned(),
                    label,
                    ok: false,
                    error_kind: Some(failure.kind),
                    error: Some(failure.message.clone()),
                },
            }
        })
        .collect()
}

pub async fn handle(config: RouterConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = Coordinator::oneshot(config, |c| async move {
        c.snapshot()
            .ok_or_else(|| zyxly_core::CoreError::Internal("no snapshot after refresh".into()))
    })
    .await?;

    let color = output::should_color(&global.color);
    let rows = summarize(&snapshot);
    let out = output::render_list(
        &global.output,
        &rows,
        |s| StatusRow {
            label: s.label.clone(),
            oid: s.oid.clone(),
            status: output::status_marker(s.ok, color),
            detail: match (s.error_kind, s.error.as_deref()) {
                (Some(kind), Some(msg)) => format!("{kind}: {msg}"),
                _ => String::new(),
            },
        },
        |s| format!("{}={}", s.oid, if s.ok { "ok" } else { "failed" }),
    )?;
    output::print_output(&out, global.quiet);

    if !global.quiet && matches!(global.output, crate::cli::OutputFormat::Table) {
        eprintln!(
            "{} of {} endpoints answered in {} ms",
            snapshot.len() - snapshot.failed_count(),
            snapshot.len(),
            snapshot.duration().as_millis()
        );
    }
    Ok(())
}
