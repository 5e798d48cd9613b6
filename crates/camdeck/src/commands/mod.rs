//! Command dispatch: bridges CLI args → API calls → output formatting.

pub mod auth;
pub mod cameras;
pub mod config_cmd;
pub mod health;
pub mod nvrs;
pub mod recordings;
pub mod users;
pub mod util;

use camdeck_api::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    session: &Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Cameras(args) => cameras::handle(session, args, global).await,
        Command::Nvrs(args) => nvrs::handle(session, args, global).await,
        Command::Users(args) => users::handle(session, args, global).await,
        Command::Recordings(args) => recordings::handle(session, args, global).await,
        Command::Health => health::handle(session, global).await,
        Command::Auth(args) => auth::handle(session, &args, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
