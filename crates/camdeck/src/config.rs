//! Profile resolution and session bootstrap for the CLI.
//!
//! Priority at every step: CLI flag > profile > environment. The session
//! is logged in before dispatch and logged out (best-effort) after.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use camdeck_api::{ApiClient, Session, TlsMode, TransportConfig};
use camdeck_config::{Config, Profile};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use camdeck_config::{config_path, load_config_or_default, save_config};

/// The profile name in effect: `--profile` > config default > "default".
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the transport from profile + CLI overrides.
fn build_transport(profile: Option<&Profile>, global: &GlobalOpts) -> TransportConfig {
    let mut transport =
        profile.map_or_else(TransportConfig::default, camdeck_config::profile_transport);
    if global.insecure {
        transport.tls = TlsMode::DangerAcceptInvalid;
    }
    transport.timeout = Duration::from_secs(global.timeout);
    transport
}

/// Resolve the backend URL: `--server` > profile.
fn resolve_server(profile: Option<&Profile>, global: &GlobalOpts) -> Result<Url, CliError> {
    let raw = global
        .server
        .clone()
        .or_else(|| profile.map(|p| p.server.clone()))
        .ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;

    raw.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Resolve credentials: CLI flags > profile/env chain > interactive prompt.
fn resolve_credentials(
    profile: Option<&Profile>,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<(String, SecretString), CliError> {
    if let (Some(username), Some(password)) = (&global.username, &global.password) {
        return Ok((username.clone(), SecretString::from(password.clone())));
    }

    if let Some(profile) = profile {
        let mut profile = profile.clone();
        if let Some(ref username) = global.username {
            profile.username = Some(username.clone());
        }
        if let Some(ref password) = global.password {
            profile.password = Some(password.clone());
        }
        match camdeck_config::resolve_credentials(&profile, profile_name) {
            Ok(creds) => return Ok(creds),
            Err(camdeck_config::ConfigError::NoCredentials { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }

    // Last resort: prompt, but only on a real terminal.
    if std::io::stdin().is_terminal() {
        let username = match &global.username {
            Some(u) => u.clone(),
            None => dialoguer::Input::<String>::new()
                .with_prompt("Username")
                .interact_text()
                .map_err(|e| CliError::Io(std::io::Error::other(e.to_string())))?,
        };
        let password = rpassword::prompt_password("Password: ")?;
        return Ok((username, SecretString::from(password)));
    }

    Err(CliError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Build the client and log in, returning a live session.
pub async fn connect(global: &GlobalOpts) -> Result<Session, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);
    let profile = cfg.profiles.get(&profile_name);

    // An explicitly named profile must exist; the implicit default may not.
    if global.profile.is_some() && profile.is_none() {
        let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }

    let server = resolve_server(profile, global)?;
    let transport = build_transport(profile, global);
    let client = ApiClient::new(server.clone(), &transport).map_err(CliError::from)?;

    let (username, password) = resolve_credentials(profile, &profile_name, global)?;

    let mut session = Session::new(Arc::new(client));
    session
        .login(&username, &password)
        .await
        .map_err(|e| match e {
            camdeck_api::Error::Transport(te) if te.is_connect() => CliError::ConnectionFailed {
                url: server.to_string(),
                source: te.into(),
            },
            other => other.into(),
        })?;

    tracing::debug!(profile = %profile_name, server = %server, "session established");
    Ok(session)
}
