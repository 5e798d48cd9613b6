//! Configuration command handlers (no backend session required).

use std::io::IsTerminal;

use camdeck_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{active_profile_name, config_path, load_config_or_default, save_config};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),
        ConfigCommand::Show => show(global),
        ConfigCommand::Path => {
            output::print_output(&config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}

fn prompt_text(prompt: &str, initial: Option<String>) -> Result<String, CliError> {
    let mut input = dialoguer::Input::<String>::new().with_prompt(prompt);
    if let Some(initial) = initial {
        input = input.with_initial_text(initial);
    }
    input
        .interact_text()
        .map_err(|e| CliError::Io(std::io::Error::other(e.to_string())))
}

/// Create or update a profile interactively.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: "config init".into(),
        });
    }

    let mut cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);
    let existing = cfg.profiles.get(&profile_name).cloned();

    let server = prompt_text(
        "Backend URL (e.g. http://nvr-host:5000)",
        global
            .server
            .clone()
            .or_else(|| existing.as_ref().map(|p| p.server.clone())),
    )?;
    let username = prompt_text(
        "Username",
        global
            .username
            .clone()
            .or_else(|| existing.as_ref().and_then(|p| p.username.clone())),
    )?;

    // Storing the password in the config file is opt-in; the default is
    // to prompt (or read CAMDECK_PASSWORD) at every invocation.
    let store_password = dialoguer::Confirm::new()
        .with_prompt("Store the password in the config file (plaintext)?")
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e.to_string())))?;
    let password = if store_password {
        Some(rpassword::prompt_password("Password: ")?)
    } else {
        existing.as_ref().and_then(|p| p.password.clone())
    };

    let profile = Profile {
        server,
        username: Some(username),
        password,
        password_env: existing.as_ref().and_then(|p| p.password_env.clone()),
        ca_cert: existing.as_ref().and_then(|p| p.ca_cert.clone()),
        insecure: if global.insecure {
            Some(true)
        } else {
            existing.as_ref().and_then(|p| p.insecure)
        },
        timeout: existing.as_ref().and_then(|p| p.timeout),
        player: existing.as_ref().and_then(|p| p.player.clone()),
    };

    cfg.profiles.insert(profile_name.clone(), profile);
    if cfg.default_profile.is_none() {
        cfg.default_profile = Some(profile_name.clone());
    }
    save_config(&cfg)?;

    if !global.quiet {
        eprintln!(
            "Profile '{profile_name}' saved to {}",
            config_path().display()
        );
    }
    Ok(())
}

/// Print the resolved configuration with passwords redacted.
fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg: Config = load_config_or_default();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("<redacted>".into());
        }
    }
    let toml_str = toml::to_string_pretty(&cfg).map_err(|e| CliError::Validation {
        field: "config".into(),
        reason: e.to_string(),
    })?;
    output::print_output(&toml_str, global.quiet);
    Ok(())
}
