use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use tracing::{debug, error};

use crate::cli::{DetectArgs, ShowDefinitionsArgs};
use crate::config::{Config, ConfigError, load_config_file};
use crate::display::{print_deep_scan, print_definitions, print_emulators, print_platform};
use crate::emulator::EmulatorCatalog;
use crate::emulator::saves::{deep_scan_directory, find_save_files};
use crate::file_info::FileInfo;
use crate::file_system::{FileSystem, HostFs};
use crate::host::HostEnvironment;
use crate::inventory::{Inventory, collect_inventory};
use crate::paths::resolve_user_path;

#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("Unable to load configuration file. See details for more information: {inner}")]
    ConfigError {
        #[from]
        inner: ConfigError,
    },
    #[error("Directory {} doesn't exist", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("Unable to write the results: {inner}")]
    CannotWrite {
        #[from]
        inner: io::Error,
    },
}

pub fn detect(args: &DetectArgs, host: &HostEnvironment) -> Result<(), DetectError> {
    let config = load_config_file(&host.home_or_empty(), args.shared.config.as_deref())?;
    detect_inner(&mut io::stdout(), &HostFs, host, &config, args)
}

fn detect_inner<W: Write, F: FileSystem>(
    out: &mut W,
    fs: &F,
    host: &HostEnvironment,
    config: &Config,
    args: &DetectArgs,
) -> Result<(), DetectError> {
    let mut host = host.clone();
    host.force_emudeck |= args.force_emudeck;

    if let Some(directory) = &args.deep_scan {
        return deep_scan_inner(out, fs, &host, directory);
    }

    let inventory = collect_inventory(fs, &host, config);
    print_platform(out, &inventory.platform)?;
    writeln!(out)?;

    let save_files = args
        .save_files
        .then(|| collect_save_files(fs, &inventory));
    print_emulators(out, &inventory.emulators, save_files.as_ref())?;

    if let Some(save_files) = &save_files {
        for (id, files) in save_files {
            writeln!(out, "\n{} ({} files)", id.bold(), files.len())?;
            for file in files {
                writeln!(out, "  {}", file.path.display())?;
            }
        }
    }

    Ok(())
}

fn collect_save_files<F: FileSystem>(fs: &F, inventory: &Inventory) -> BTreeMap<String, Vec<FileInfo>> {
    inventory
        .emulators
        .iter()
        .map(|(id, emulator)| {
            let files = find_save_files(fs, emulator)
                .into_iter()
                .filter(|path| !inventory.is_ignored(path))
                .filter_map(|path| stat_file(fs, &path))
                .collect();
            (id.clone(), files)
        })
        .collect()
}

fn deep_scan_inner<W: Write, F: FileSystem>(
    out: &mut W,
    fs: &F,
    host: &HostEnvironment,
    directory: &Path,
) -> Result<(), DetectError> {
    let directory = resolve_user_path(directory, host.home());
    if !fs.exists(&directory).unwrap_or(false) {
        error!("Deep scan directory not found: {}", directory.display());
        return Err(DetectError::DirectoryNotFound(directory));
    }

    let grouped = deep_scan_directory(fs, &EmulatorCatalog::default(), &directory)
        .into_iter()
        .map(|(id, paths)| {
            let files = paths
                .iter()
                .filter_map(|path| stat_file(fs, path))
                .collect::<Vec<_>>();
            (id, files)
        })
        .collect::<BTreeMap<_, _>>();
    print_deep_scan(out, &directory, &grouped)?;

    Ok(())
}

fn stat_file<F: FileSystem>(fs: &F, path: &Path) -> Option<FileInfo> {
    match fs.stat(path) {
        Ok(info) => Some(info),
        Err(e) => {
            debug!("Unable to read metadata of {}: {}", path.display(), e);
            None
        }
    }
}

pub fn show_definitions(args: &ShowDefinitionsArgs) -> Result<(), DetectError> {
    show_definitions_inner(&mut io::stdout(), args)
}

fn show_definitions_inner<W: Write>(out: &mut W, args: &ShowDefinitionsArgs) -> Result<(), DetectError> {
    writeln!(
        out,
        "Default save paths for the {} platform:\n",
        args.platform.to_string().green()
    )?;
    print_definitions(out, &EmulatorCatalog::default(), args.platform)?;
    Ok(())
}
