//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod domains;
pub mod login;
pub mod scans;
pub mod schedule;
pub mod templates;
pub mod util;

use cybertrap_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Domains(args) => domains::handle(controller, args, global).await,
        Command::Templates(args) => templates::handle(controller, args, global).await,
        Command::Scans(args) => scans::handle(controller, args, global).await,
        Command::Schedule(args) => schedule::handle(controller, args, global).await,
        // Handled before a controller exists
        Command::Config(_) | Command::Login(_) | Command::Logout | Command::Completions(_) => {
            Ok(())
        }
    }
}
