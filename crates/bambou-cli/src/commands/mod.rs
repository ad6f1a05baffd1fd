//! Command dispatch: bridges CLI args -> session operations -> output formatting.

pub mod config_cmd;
pub mod events;
pub mod resources;
pub mod util;

use std::sync::Arc;

use bambou::{DynamicRoot, Session, SessionContext};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

pub type VsdSession = Session<DynamicRoot>;

/// Dispatch a VSD-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    context: &SessionContext<VsdSession>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = current(context)?;

    match cmd {
        Command::Fetch(args) => resources::fetch(&session, args, global).await,
        Command::Children(args) => resources::children(&session, args, global).await,
        Command::Create(args) => resources::create(&session, args, global).await,
        Command::Save(args) => resources::save(&session, args, global).await,
        Command::Delete(args) => resources::delete(&session, args, global).await,
        Command::Assign(args) => resources::assign(&session, args, global).await,
        Command::Events(args) => events::handle(session, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

fn current(context: &SessionContext<VsdSession>) -> Result<Arc<VsdSession>, CliError> {
    context.current().ok_or_else(|| CliError::Validation {
        field: "session".into(),
        reason: "no session has been started".into(),
    })
}
