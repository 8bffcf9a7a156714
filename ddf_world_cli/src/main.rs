mod cli;
mod display;
mod error;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, RunCommand};
use ddf_world::config::Config;
use log::debug;

const DEFAULT_LOGGING_LEVEL: &str = "warn";

fn main() -> Result<()> {
    // Set RUST_LOG to `DEFAULT_LOGGING_LEVEL` if not set
    let _ =
        std::env::var("RUST_LOG").map_err(|_| std::env::set_var("RUST_LOG", DEFAULT_LOGGING_LEVEL));
    pretty_env_logger::init_timed();
    let args = Cli::parse();
    debug!("args: {args:?}");
    let config = args.apply(read_config_from_toml(args.config.as_deref())?);
    debug!("config: {config:?}");

    if let Some(command) = args.command {
        command.run(config)?;
    }
    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    // Linux: ~/.config/ddf-world/config.toml
    dirs::config_dir().map(|dir| dir.join("ddf-world").join("config.toml"))
}

/// Read the config from `file_path`, or from the default location when not given. Only a missing
/// file at the default location falls back to `Config::default()`.
fn read_config_from_toml(file_path: Option<&Path>) -> Result<Config> {
    let (file_path, explicit) = match file_path {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(Config::default()),
        },
    };
    match std::fs::read_to_string(&file_path) {
        Ok(contents) => toml::from_str(&contents)
            .with_context(|| format!("Invalid TOML in config file '{}'", file_path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => Ok(Config::default()),
        Err(e) => Err(e)
            .with_context(|| format!("Error reading config file '{}'", file_path.display())),
    }
}
