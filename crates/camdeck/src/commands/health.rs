//! Stream health command handler.

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;

use camdeck_api::Session;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Serialize, Tabled)]
struct HealthRow {
    #[tabled(rename = "STREAM")]
    stream: String,
    #[tabled(rename = "STATE")]
    state: String,
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let health = session.client().stream_health().await?;

    let color = output::should_color(&global.color)
        && matches!(global.output, OutputFormat::Table);

    let mut entries: Vec<(String, bool)> = health.into_iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let rows: Vec<HealthRow> = entries
        .iter()
        .map(|(stream, online)| HealthRow {
            stream: stream.clone(),
            state: state_label(*online, color),
        })
        .collect();

    let rendered = output::render_list(&global.output, &rows, clone_row, |row| row.stream.clone());
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn clone_row(row: &HealthRow) -> HealthRow {
    HealthRow {
        stream: row.stream.clone(),
        state: row.state.clone(),
    }
}

fn state_label(online: bool, color: bool) -> String {
    match (online, color) {
        (true, true) => format!("{}", "online".green()),
        (true, false) => "online".into(),
        (false, true) => format!("{}", "offline".red()),
        (false, false) => "offline".into(),
    }
}
