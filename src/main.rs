//! launch-at-login -- inspect or change the current app's login item.
//!
//! Entry point: argument parsing, logger setup and config resolution.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use launch_at_login::{Config, LoginItemError, LoginItemState};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(version, about = "Register an app bundle as a login item")]
struct Cli {
    /// TOML config file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Bundle identifier; overrides the config file and the main bundle.
    #[arg(long, value_name = "ID")]
    bundle_id: Option<String>,

    /// Helper identifier suffix; overrides the config file.
    #[arg(long, value_name = "SUFFIX")]
    suffix: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Print whether the helper launches at login.
    Status,
    /// Register the helper.
    Enable,
    /// Unregister the helper.
    Disable,
    /// Flip the current state.
    Toggle,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(enabled) => {
            println!("{}", if enabled { "enabled" } else { "disabled" });
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool, LoginItemError> {
    let config = resolve_config(&cli)?;
    let state = LoginItemState::from_config(&config)?;
    log::debug!("main: helper identifier {}", state.identifier());

    match cli.command {
        Command::Status => Ok(state.is_enabled()),
        Command::Enable => state.set_enabled(true).map(|()| state.is_enabled()),
        Command::Disable => state.set_enabled(false).map(|()| state.is_enabled()),
        Command::Toggle => state.toggle(),
    }
}

/// Loads the config file (if any) and applies command-line overrides.
fn resolve_config(cli: &Cli) -> Result<Config, LoginItemError> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(bundle_id) = &cli.bundle_id {
        config.bundle_identifier = Some(bundle_id.clone());
    }
    if let Some(suffix) = &cli.suffix {
        config.helper_suffix = suffix.clone();
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
