//! Raw DAL object fetch.

use zyxly_core::{Coordinator, CoreError, RouterConfig};

use crate::cli::{GlobalOpts, OutputFormat, QueryArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    config: RouterConfig,
    args: QueryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let oid = args.oid.trim();
    if oid.is_empty() {
        return Err(CliError::Validation {
            field: "oid".into(),
            reason: "object identifier cannot be empty".into(),
        });
    }

    let coordinator = Coordinator::new(config)?;
    let client = coordinator.client();
    client.login().await.map_err(CoreError::from)?;
    let result = client.query(oid).await;
    client.clear_session();
    let value = result.map_err(CoreError::from)?;

    // Raw objects have no tabular shape; the table view is pretty JSON.
    let format = match global.output {
        OutputFormat::Table | OutputFormat::Plain => OutputFormat::Json,
        ref other => other.clone(),
    };
    let out = output::render_single(&format, &value, |_| String::new(), |_| String::new())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
