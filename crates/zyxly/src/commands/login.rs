//! Login check.

use zyxly_core::{Coordinator, CoreError, RouterConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(config: RouterConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let coordinator = Coordinator::new(config)?;
    let client = coordinator.client();

    client.login().await.map_err(CoreError::from)?;
    let name = client.router_name();
    client.clear_session();

    let color = output::should_color(&global.color);
    output::print_success(&format!("Logged in to {name}"), color, global.quiet);
    Ok(())
}
