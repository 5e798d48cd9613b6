//! Clap derive structures for the `camdeck` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// camdeck — command-line console for an NVR aggregation backend
#[derive(Debug, Parser)]
#[command(
    name = "camdeck",
    version,
    about = "Manage cameras, NVRs, users, and recordings from the command line",
    long_about = "Scriptable console for a camdeck NVR aggregation backend.\n\n\
        Talks to the same REST surface as the terminal UI: camera and NVR\n\
        inventory, user accounts, recorded segments, and stream health.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "CAMDECK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'S', env = "CAMDECK_SERVER", global = true)]
    pub server: Option<String>,

    /// Username for session login
    #[arg(long, short = 'u', env = "CAMDECK_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for session login (prefer CAMDECK_PASSWORD or the prompt)
    #[arg(long, env = "CAMDECK_PASSWORD", global = true, hide_env = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CAMDECK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "CAMDECK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "CAMDECK_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage camera stream registrations
    #[command(alias = "cam", alias = "c")]
    Cameras(CamerasArgs),

    /// Manage recorder appliances
    #[command(alias = "nvr", alias = "n")]
    Nvrs(NvrsArgs),

    /// Manage user accounts
    #[command(alias = "u")]
    Users(UsersArgs),

    /// Browse recorded segments
    #[command(alias = "rec", alias = "r")]
    Recordings(RecordingsArgs),

    /// Stream health report (online/offline per stream)
    Health,

    /// Session and identity helpers
    Auth(AuthArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Cameras ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CamerasArgs {
    #[command(subcommand)]
    pub command: CamerasCommand,
}

#[derive(Debug, Subcommand)]
pub enum CamerasCommand {
    /// List all cameras
    #[command(alias = "ls")]
    List,

    /// Register a camera
    Create {
        /// Stream key (slug, unique)
        name: String,

        /// Human-readable name
        #[arg(long)]
        display_name: String,

        /// Full RTSP source URL
        #[arg(long)]
        rtsp_url: String,

        /// Attach to an NVR by id (omit for standalone)
        #[arg(long)]
        nvr: Option<i64>,

        /// Register as inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Update a camera (only the given fields change)
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        rtsp_url: Option<String>,

        /// Re-attach to an NVR by id
        #[arg(long, conflicts_with = "standalone")]
        nvr: Option<i64>,

        /// Detach from its NVR
        #[arg(long)]
        standalone: bool,

        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete a camera and its gateway stream
    #[command(alias = "rm")]
    Delete { id: i64 },

    /// Enable recording for a camera
    EnableRecording { id: i64 },

    /// Disable recording for a camera
    DisableRecording { id: i64 },
}

// ── NVRs ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NvrsArgs {
    #[command(subcommand)]
    pub command: NvrsCommand,
}

#[derive(Debug, Subcommand)]
pub enum NvrsCommand {
    /// List all NVRs
    #[command(alias = "ls")]
    List,

    /// Register an NVR and import its channels
    Create {
        /// Slug (unique)
        name: String,

        /// Human-readable name
        #[arg(long)]
        display_name: String,

        #[arg(long)]
        ip_address: Option<String>,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        password: Option<String>,

        /// Channels to import (main+sub rows each)
        #[arg(long, default_value = "50")]
        max_channels: u32,
    },

    /// Update an NVR (only the given fields change)
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        ip_address: Option<String>,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        password: Option<String>,

        #[arg(long)]
        max_channels: Option<u32>,

        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete an NVR and all of its cameras
    #[command(alias = "rm")]
    Delete { id: i64 },

    /// Re-import channel streams from the device
    Sync { id: i64 },
}

// ── Users ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List all accounts
    #[command(alias = "ls")]
    List,

    /// Create an account
    Create {
        username: String,

        /// Password (prompted when omitted on a terminal)
        #[arg(long)]
        password: Option<String>,

        /// Account role
        #[arg(long, default_value = "viewer")]
        role: RoleArg,
    },

    /// Update an account (only the given fields change)
    Update {
        id: i64,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        password: Option<String>,

        #[arg(long)]
        role: Option<RoleArg>,
    },

    /// Delete an account
    #[command(alias = "rm")]
    Delete { id: i64 },

    /// Show which NVRs a viewer account can access
    ShowNvrs { id: i64 },

    /// Replace a viewer account's NVR access list
    GrantNvrs {
        id: i64,

        /// NVR ids (empty revokes all access)
        nvr_ids: Vec<i64>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Admin,
    Viewer,
}

impl From<RoleArg> for camdeck_api::Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Self::Admin,
            RoleArg::Viewer => Self::Viewer,
        }
    }
}

// ── Recordings ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RecordingsArgs {
    #[command(subcommand)]
    pub command: RecordingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RecordingsCommand {
    /// List recorded segments grouped by camera
    #[command(alias = "ls")]
    List {
        /// Restrict to one camera name
        #[arg(long)]
        camera: Option<String>,
    },

    /// Print the playback/download URL for a segment
    Url {
        /// Camera name the segment belongs to
        camera: String,

        /// Segment filename
        filename: String,
    },
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Show the identity behind the current credentials
    Whoami,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile interactively
    Init,

    /// Print the resolved configuration (passwords redacted)
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
