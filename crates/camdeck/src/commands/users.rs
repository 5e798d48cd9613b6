//! User account command handlers.

use std::io::IsTerminal;

use tabled::Tabled;

use camdeck_api::{NewUser, Session, User, UserPatch};

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "USERNAME")]
    username: String,
    #[tabled(rename = "ROLE")]
    role: String,
}

fn to_row(user: &User) -> UserRow {
    UserRow {
        id: user.id,
        username: user.username.clone(),
        role: user.role.to_string(),
    }
}

/// Resolve the password for account creation: flag > prompt.
fn resolve_new_password(flag: Option<String>) -> Result<String, CliError> {
    if let Some(password) = flag {
        return Ok(password);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "required; pass --password in non-interactive contexts".into(),
        });
    }
    Ok(rpassword::prompt_password("Password for new account: ")?)
}

pub async fn handle(
    session: &Session,
    args: UsersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = session.client();

    match args.command {
        UsersCommand::List => {
            let users = client.list_users().await?;
            let rendered =
                output::render_list(&global.output, &users, to_row, |u| u.username.clone());
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        UsersCommand::Create {
            username,
            password,
            role,
        } => {
            let new = NewUser {
                username,
                password: resolve_new_password(password)?,
                role: role.into(),
            };
            let reply = client.create_user(&new).await?;
            util::mutation_note(reply.message.as_deref(), "User created.", global.quiet);
            Ok(())
        }

        UsersCommand::Update {
            id,
            username,
            password,
            role,
        } => {
            let patch = UserPatch {
                username,
                password,
                role: role.map(Into::into),
            };
            let reply = client.update_user(id, &patch).await?;
            util::mutation_note(reply.message.as_deref(), "User updated.", global.quiet);
            Ok(())
        }

        UsersCommand::Delete { id } => {
            if !util::confirm(&format!("Delete user {id}? This is destructive."), global.yes)? {
                return Ok(());
            }
            let reply = client.delete_user(id).await?;
            util::mutation_note(reply.message.as_deref(), "User deleted.", global.quiet);
            Ok(())
        }

        UsersCommand::ShowNvrs { id } => {
            let nvr_ids = client.user_nvrs(id).await?;
            let rendered = nvr_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        UsersCommand::GrantNvrs { id, nvr_ids } => {
            let reply = client.set_user_nvrs(id, &nvr_ids).await?;
            util::mutation_note(reply.message.as_deref(), "NVR access updated.", global.quiet);
            Ok(())
        }
    }
}
