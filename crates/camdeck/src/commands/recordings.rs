//! Recordings command handlers.

use serde::Serialize;
use tabled::Tabled;

use camdeck_api::{Recording, Session};

use crate::cli::{GlobalOpts, RecordingsArgs, RecordingsCommand};
use crate::error::CliError;
use crate::output;

#[derive(Serialize, Tabled)]
struct SegmentRow {
    #[tabled(rename = "CAMERA")]
    camera: String,
    #[tabled(rename = "STARTED")]
    started: String,
    #[tabled(rename = "SIZE (MB)")]
    size_mb: String,
    #[tabled(rename = "FILENAME")]
    filename: String,
}

fn to_row(rec: &Recording) -> SegmentRow {
    SegmentRow {
        camera: rec.camera_name.clone(),
        started: rec
            .started_at
            .map_or_else(|| "-".into(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        size_mb: format!("{:.1}", rec.size_mb),
        filename: rec.filename.clone(),
    }
}

pub async fn handle(
    session: &Session,
    args: RecordingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = session.client();

    match args.command {
        RecordingsCommand::List { camera } => {
            let groups = client.list_recordings(camera.as_deref()).await?;
            // Flatten grouped segments; the map is already sorted by camera
            // and each group newest-first.
            let segments: Vec<Recording> = groups.into_values().flatten().collect();
            let rendered = output::render_list(&global.output, &segments, to_row, |r| {
                format!("{}/{}", r.camera_name, r.filename)
            });
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        RecordingsCommand::Url { camera, filename } => {
            let groups = client.list_recordings(Some(&camera)).await?;
            let segment = groups
                .get(&camera)
                .and_then(|segs| segs.iter().find(|r| r.filename == filename))
                .ok_or_else(|| CliError::NotFound {
                    message: format!("recording '{camera}/{filename}' not found"),
                })?;
            output::print_output(client.recording_url(segment).as_str(), global.quiet);
            Ok(())
        }
    }
}
