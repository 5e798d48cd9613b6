//! NVR command handlers.

use tabled::Tabled;

use camdeck_api::{NewNvr, Nvr, NvrPatch, Session};

use crate::cli::{GlobalOpts, NvrsArgs, NvrsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct NvrRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DISPLAY NAME")]
    display_name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "CHANNELS")]
    max_channels: u32,
    #[tabled(rename = "CAMERAS")]
    camera_count: u32,
    #[tabled(rename = "ACTIVE")]
    active: &'static str,
}

fn to_row(nvr: &Nvr) -> NvrRow {
    NvrRow {
        id: nvr.id,
        name: nvr.name.clone(),
        display_name: nvr.display_name.clone(),
        ip: nvr.ip_address.clone().unwrap_or_else(|| "-".into()),
        max_channels: nvr.max_channels,
        camera_count: nvr.camera_count,
        active: if nvr.active { "yes" } else { "no" },
    }
}

pub async fn handle(session: &Session, args: NvrsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = session.client();

    match args.command {
        NvrsCommand::List => {
            let nvrs = client.list_nvrs().await?;
            let rendered = output::render_list(&global.output, &nvrs, to_row, |n| n.name.clone());
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        NvrsCommand::Create {
            name,
            display_name,
            ip_address,
            username,
            password,
            max_channels,
        } => {
            let new = NewNvr {
                name,
                display_name,
                ip_address,
                username,
                password,
                max_channels,
            };
            let reply = client.create_nvr(&new).await?;
            let created = reply.value;
            util::mutation_note(
                reply.message.as_deref(),
                &format!(
                    "NVR created. {} streams imported, {} skipped.",
                    created.imported, created.skipped
                ),
                global.quiet,
            );
            Ok(())
        }

        NvrsCommand::Update {
            id,
            name,
            display_name,
            ip_address,
            username,
            password,
            max_channels,
            active,
        } => {
            let patch = NvrPatch {
                name,
                display_name,
                ip_address,
                username,
                password,
                max_channels,
                active,
            };
            let reply = client.update_nvr(id, &patch).await?;
            util::mutation_note(reply.message.as_deref(), "NVR updated.", global.quiet);
            Ok(())
        }

        NvrsCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete NVR {id} and all of its cameras? This is destructive."),
                global.yes,
            )? {
                return Ok(());
            }
            let reply = client.delete_nvr(id).await?;
            util::mutation_note(reply.message.as_deref(), "NVR deleted.", global.quiet);
            Ok(())
        }

        NvrsCommand::Sync { id } => {
            let reply = client.sync_nvr(id).await?;
            let report = reply.value;
            util::mutation_note(
                reply.message.as_deref(),
                &format!(
                    "Sync complete: {} new streams, {} already existed.",
                    report.created, report.skipped
                ),
                global.quiet,
            );
            Ok(())
        }
    }
}
