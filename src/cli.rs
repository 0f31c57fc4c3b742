use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::types::PlatformKind;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Sets the level of verbosity (--verbose/-v, -vv for tracing output)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detects the platform and installed emulators (default command)
    Detect(DetectArgs),
    /// Shows the emulator definitions and their default save paths
    ShowDefinitions(ShowDefinitionsArgs),
    /// Lists paths from the configuration file and whether they exist
    Paths(ConfigArgs),
    /// Syncs detected save directories with the rclone remote
    Sync(SyncArgs),
    /// Generates a skeleton of the configuration file
    GenerateConfig,
}

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Use the following config file instead of autodiscovery process
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug, Default)]
pub struct DetectArgs {
    /// Lists save files of every detected emulator
    #[arg(short = 's', long)]
    pub save_files: bool,
    /// Attributes every file in DIR to an emulator by its extension
    #[arg(short = 'd', long, value_name = "DIR")]
    pub deep_scan: Option<PathBuf>,
    /// Treats the host as an EmuDeck installation
    #[arg(long)]
    pub force_emudeck: bool,
    #[command(flatten)]
    pub shared: ConfigArgs,
}

#[derive(Parser, Debug, Default)]
pub struct ShowDefinitionsArgs {
    /// Platform whose default paths are shown
    #[arg(short = 'p', long, default_value_t = PlatformKind::Generic)]
    pub platform: PlatformKind,
}

#[derive(Parser, Debug, Default)]
pub struct SyncArgs {
    /// Syncs only the emulator with this id
    #[arg(short = 'e', long, value_name = "ID")]
    pub emulator: Option<String>,
    /// Shows what would be transferred without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
    /// Copies from the remote to this machine instead
    #[arg(long)]
    pub pull: bool,
    /// Treats the host as an EmuDeck installation
    #[arg(long)]
    pub force_emudeck: bool,
    #[command(flatten)]
    pub shared: ConfigArgs,
}
