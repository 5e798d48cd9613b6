//! Session/identity command handlers.

use camdeck_api::Session;

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(session: &Session, args: &AuthArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AuthCommand::Whoami => {
            // `connect` already logged in, so the user is always present here.
            let user = session.user().ok_or_else(|| CliError::AuthFailed {
                message: "no active session".into(),
            })?;
            let rendered = output::render_single(
                &global.output,
                user,
                |u| format!("{} (id {}, role {})", u.username, u.id, u.role),
                |u| u.username.clone(),
            );
            output::print_output(&rendered, global.quiet);
            Ok(())
        }
    }
}
