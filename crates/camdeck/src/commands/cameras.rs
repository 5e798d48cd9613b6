//! Camera command handlers.

use tabled::Tabled;

use camdeck_api::{Camera, CameraPatch, NewCamera, Session};

use crate::cli::{CamerasArgs, CamerasCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct CameraRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DISPLAY NAME")]
    display_name: String,
    #[tabled(rename = "NVR")]
    nvr: String,
    #[tabled(rename = "ACTIVE")]
    active: &'static str,
    #[tabled(rename = "REC")]
    recording: &'static str,
}

fn to_row(cam: &Camera) -> CameraRow {
    CameraRow {
        id: cam.id,
        name: cam.name.clone(),
        display_name: cam.display_name.clone(),
        nvr: cam.nvr_name.clone().unwrap_or_else(|| "-".into()),
        active: if cam.active { "yes" } else { "no" },
        recording: if cam.recording_enabled { "on" } else { "off" },
    }
}

pub async fn handle(
    session: &Session,
    args: CamerasArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = session.client();

    match args.command {
        CamerasCommand::List => {
            let cameras = client.list_cameras().await?;
            let rendered = output::render_list(&global.output, &cameras, to_row, |c| {
                c.name.clone()
            });
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        CamerasCommand::Create {
            name,
            display_name,
            rtsp_url,
            nvr,
            inactive,
        } => {
            let new = NewCamera {
                name,
                display_name,
                rtsp_url,
                nvr_id: nvr,
                active: !inactive,
            };
            let reply = client.create_camera(&new).await?;
            util::mutation_note(reply.message.as_deref(), "Camera created.", global.quiet);
            let rendered = output::render_single(
                &global.output,
                &reply.value,
                |c| format!("{} (id {})", c.display_name, c.id),
                |c| c.name.clone(),
            );
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        CamerasCommand::Update {
            id,
            name,
            display_name,
            rtsp_url,
            nvr,
            standalone,
            active,
        } => {
            let patch = CameraPatch {
                name,
                display_name,
                rtsp_url,
                nvr_id: if standalone {
                    Some(None)
                } else {
                    nvr.map(Some)
                },
                active,
            };
            let reply = client.update_camera(id, &patch).await?;
            util::mutation_note(reply.message.as_deref(), "Camera updated.", global.quiet);
            Ok(())
        }

        CamerasCommand::Delete { id } => {
            if !util::confirm(&format!("Delete camera {id}? This is destructive."), global.yes)? {
                return Ok(());
            }
            let reply = client.delete_camera(id).await?;
            util::mutation_note(reply.message.as_deref(), "Camera deleted.", global.quiet);
            Ok(())
        }

        CamerasCommand::EnableRecording { id } => set_recording(session, id, true, global).await,
        CamerasCommand::DisableRecording { id } => set_recording(session, id, false, global).await,
    }
}

async fn set_recording(
    session: &Session,
    id: i64,
    enabled: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let reply = session.client().set_recording(id, enabled).await?;
    // Report the flag the backend stored, which may differ from the request.
    let stored = reply.value;
    util::mutation_note(
        reply.message.as_deref(),
        &format!(
            "Recording {} for camera {id}.",
            if stored { "enabled" } else { "disabled" }
        ),
        global.quiet,
    );
    if stored != enabled && !global.quiet {
        eprintln!("note: backend reports recording_enabled={stored}");
    }
    Ok(())
}
