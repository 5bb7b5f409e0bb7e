//! Command dispatch: bridges CLI args -> facade operations -> output formatting.

pub mod config_cmd;
pub mod deviations;
pub mod stats;
pub mod util;

use devtrack_core::DeviationFacade;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    facade: &DeviationFacade,
    global: &GlobalOpts,
    page_size: u32,
) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => deviations::list(facade, args, global, page_size).await,
        Command::Get { id } => deviations::get(facade, &id, global).await,
        Command::Create(args) => deviations::create(facade, args, global).await,
        Command::Update(args) => deviations::update(facade, args, global).await,
        Command::Delete { id } => deviations::delete(facade, &id, global).await,
        Command::View { id } => deviations::view(facade, &id, global).await,
        Command::Stats => stats::handle(facade, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
