//! Command dispatch: bridges CLI args -> coordinator -> output formatting.

pub mod config_cmd;
pub mod device;
pub mod get;
pub mod login;
pub mod query;
pub mod sensors;
pub mod status;
pub mod watch;

use zyxly_core::RouterConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a router-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: RouterConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login => login::handle(config, global).await,
        Command::Query(args) => query::handle(config, args, global).await,
        Command::Status => status::handle(config, global).await,
        Command::Sensors(args) => sensors::handle(config, &args, global).await,
        Command::Device => device::handle(config, global).await,
        Command::Get(args) => get::handle(config, args, global).await,
        Command::Watch(args) => watch::handle(config, &args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
