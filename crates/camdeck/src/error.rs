//! CLI error types with miette diagnostics.
//!
//! Maps `camdeck_api::Error` and `ConfigError` into user-facing errors
//! with actionable help text and deterministic exit codes.

use miette::Diagnostic;
use thiserror::Error;

/// Exit codes, stable for scripting.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to backend at {url}")]
    #[diagnostic(
        code(camdeck::connection_failed),
        help(
            "Check that the backend is running and accessible.\n\
             URL: {url}\n\
             Try: camdeck health --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS certificate verification failed for {url}")]
    #[diagnostic(
        code(camdeck::tls_error),
        help(
            "The backend is behind a self-signed certificate.\n\
             Use --insecure (-k) to accept it, or configure ca_cert in your profile."
        )
    )]
    TlsError { url: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(camdeck::auth_failed),
        help("Verify the username and password for this backend.")
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(camdeck::no_credentials),
        help(
            "Configure credentials with: camdeck config init\n\
             Or set CAMDECK_USERNAME / CAMDECK_PASSWORD environment variables."
        )
    )]
    NoCredentials { profile: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(camdeck::permission),
        help("This operation requires an admin account.")
    )]
    Permission { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(camdeck::not_found))]
    NotFound { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Backend error: {message}")]
    #[diagnostic(code(camdeck::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(camdeck::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(camdeck::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: camdeck config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(camdeck::no_config),
        help(
            "Pass --server, or create a profile with: camdeck config init\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(camdeck::config))]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(camdeck::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(camdeck::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(camdeck::json), help("Check the JSON contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Permission { .. } => exit_code::PERMISSION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── camdeck_api::Error → CliError mapping ────────────────────────────

impl From<camdeck_api::Error> for CliError {
    fn from(err: camdeck_api::Error) -> Self {
        match err {
            camdeck_api::Error::Authentication { message } => Self::AuthFailed { message },

            camdeck_api::Error::Forbidden { message } => Self::Permission { message },

            camdeck_api::Error::NotFound { message } => Self::NotFound { message },

            camdeck_api::Error::Api { message, .. } => Self::ApiError { message },

            camdeck_api::Error::Transport(e) => {
                if e.is_timeout() {
                    Self::Timeout { seconds: 0 }
                } else {
                    Self::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "(unknown)".into(), ToString::to_string),
                        source: e.into(),
                    }
                }
            }

            camdeck_api::Error::InvalidUrl(e) => Self::Validation {
                field: "server".into(),
                reason: e.to_string(),
            },

            camdeck_api::Error::Tls(message) => Self::TlsError { url: message },

            camdeck_api::Error::Deserialization { message, .. } => {
                Self::ApiError { message }
            }
        }
    }
}

impl From<camdeck_config::ConfigError> for CliError {
    fn from(err: camdeck_config::ConfigError) -> Self {
        match err {
            camdeck_config::ConfigError::NoCredentials { profile } => {
                Self::NoCredentials { profile }
            }
            camdeck_config::ConfigError::Validation { field, reason } => {
                Self::Validation { field, reason }
            }
            camdeck_config::ConfigError::Figment(e) => Self::Config(e),
            camdeck_config::ConfigError::Io(e) => Self::Io(e),
            camdeck_config::ConfigError::Serialization(e) => Self::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
        }
    }
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
