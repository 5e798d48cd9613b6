//! `camdeck-tui` — terminal console for an NVR aggregation backend.
//!
//! Built on [ratatui](https://ratatui.rs). A background data bridge owns
//! the backend session and all REST I/O; screens are navigable via number
//! keys (1-5): Live, Cameras, NVRs, Users, and Recordings.
//!
//! Logs are written to a file (default `/tmp/camdeck-tui.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app
//! launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use camdeck_api::{ApiClient, TlsMode, TransportConfig};

use crate::app::App;

/// Terminal console for monitoring and managing an NVR aggregation
/// backend.
#[derive(Parser, Debug)]
#[command(name = "camdeck-tui", version, about)]
struct Cli {
    /// Backend URL (e.g., http://nvr-host:5000)
    #[arg(short = 'S', long, env = "CAMDECK_SERVER")]
    server: Option<String>,

    /// Backend profile from the shared config file
    #[arg(short = 'p', long, env = "CAMDECK_PROFILE")]
    profile: Option<String>,

    /// External player executable for stream playback
    #[arg(long, env = "CAMDECK_PLAYER")]
    player: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(short = 'k', long, env = "CAMDECK_INSECURE")]
    insecure: bool,

    /// Log file path (defaults to /tmp/camdeck-tui.log)
    #[arg(long, default_value = "/tmp/camdeck-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that
/// would corrupt the TUI output. Returns a guard that must be held for
/// the lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("camdeck_tui={log_level},camdeck_api={log_level}")));

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("camdeck-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Resolve the backend client and player command from CLI flags and the
/// shared config file. Priority: flags > profile > defaults.
fn build_client(cli: &Cli) -> Result<(Arc<ApiClient>, String)> {
    let cfg = camdeck_config::load_config_or_default();
    let profile_name = cli
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into());
    let profile = cfg.profiles.get(&profile_name);

    let server = cli
        .server
        .clone()
        .or_else(|| profile.map(|p| p.server.clone()))
        .ok_or_else(|| {
            eyre!(
                "no backend configured — pass --server or create a profile with `camdeck config init`"
            )
        })?;
    let url: url::Url = server
        .parse()
        .map_err(|e| eyre!("invalid backend URL '{server}': {e}"))?;

    let mut transport = profile.map_or_else(TransportConfig::default, camdeck_config::profile_transport);
    if cli.insecure {
        transport.tls = TlsMode::DangerAcceptInvalid;
    }

    let player = cli
        .player
        .clone()
        .or_else(|| profile.and_then(|p| p.player.clone()))
        .unwrap_or_else(|| "mpv".into());

    let client = ApiClient::new(url, &transport)?;
    Ok((Arc::new(client), player))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file — hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let (client, player) = build_client(&cli)?;

    info!(server = %client.base_url(), player = %player, "starting camdeck-tui");

    let mut app = App::new(client, player);
    app.run().await?;

    Ok(())
}
