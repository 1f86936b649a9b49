//! Single value lookup by path.

use serde_json::Value;

use zyxly_core::{Coordinator, PathSegment, RouterConfig, display_path, parse_path};

use crate::cli::{GetArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Join the positional path arguments into one lookup path.
fn collect_path(parts: &[String]) -> Vec<PathSegment> {
    parts.iter().flat_map(|p| parse_path(p)).collect()
}

/// `--default` is read as JSON when it parses, else taken literally.
fn parse_default(raw: Option<&str>) -> Value {
    raw.map_or(Value::Null, |s| {
        serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.to_owned()))
    })
}

/// Strings print bare; everything else as compact JSON.
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub async fn handle(
    mut config: RouterConfig,
    args: GetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let path = collect_path(&args.path);
    if path.is_empty() {
        return Err(CliError::Validation {
            field: "path".into(),
            reason: "at least one path segment is required".into(),
        });
    }
    let default = parse_default(args.default.as_deref());
    tracing::debug!(oid = %args.oid, path = %display_path(&path), "reading value");

    if !config.endpoints.iter().any(|oid| oid == &args.oid) {
        config.endpoints.push(args.oid.clone());
    }

    let oid = args.oid;
    let value = Coordinator::oneshot(config, |c| async move { Ok(c.get(&oid, &path, default)) })
        .await?;

    let out = match global.output {
        OutputFormat::Table | OutputFormat::Plain => plain(&value),
        ref format => output::render_single(format, &value, plain, plain)?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
