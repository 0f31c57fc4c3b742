use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::{CliArgs, Commands, DetectArgs};
use crate::detect::{detect, show_definitions};
use crate::generate_config::generate_config;
use crate::host::HostEnvironment;
use crate::logging::{LoggingLevel, setup_logging};
use crate::show_paths::show_paths;
use crate::sync::sync;

mod cli;
mod config;
mod detect;
mod display;
mod emulator;
mod file_info;
mod file_system;
#[cfg(test)]
mod files_db;
mod generate_config;
mod host;
mod inventory;
mod logging;
mod paths;
mod platform;
mod show_paths;
mod sync;
mod types;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(LoggingLevel::from(args.verbosity))?;

    let host = HostEnvironment::from_env();

    match args.command {
        Some(Commands::GenerateConfig) => {
            let home_dir = host
                .home()
                .context("Couldn't identify your home directory.")?;
            generate_config(home_dir)?;
        }
        Some(Commands::ShowDefinitions(cmd_args)) => show_definitions(&cmd_args)?,
        Some(Commands::Paths(cmd_args)) => show_paths(&cmd_args, &host)?,
        Some(Commands::Sync(cmd_args)) => sync(&cmd_args, &host)?,
        Some(Commands::Detect(cmd_args)) => detect(&cmd_args, &host)?,
        None => detect(&DetectArgs::default(), &host)?,
    }

    Ok(())
}
