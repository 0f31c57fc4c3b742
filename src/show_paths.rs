use std::io::{self, Write};
use std::path::Path;

use owo_colors::OwoColorize;

use crate::cli::ConfigArgs;
use crate::config::{Config, load_config_file};
use crate::detect::DetectError;
use crate::emulator::EmulatorCatalog;
use crate::file_system::{FileSystem, HostFs};
use crate::host::HostEnvironment;
use crate::paths::resolve_user_path;

pub fn show_paths(args: &ConfigArgs, host: &HostEnvironment) -> Result<(), DetectError> {
    let config = load_config_file(&host.home_or_empty(), args.config.as_deref())?;
    show_paths_inner(&mut io::stdout(), &HostFs, host, &config)
}

fn show_paths_inner<W: Write, F: FileSystem>(
    out: &mut W,
    fs: &F,
    host: &HostEnvironment,
    config: &Config,
) -> Result<(), DetectError> {
    if config.emulator_paths.is_empty() && config.scan_dirs.is_empty() && config.ignore_dirs.is_empty() {
        writeln!(out, "{}", "No custom paths configured.".yellow())?;
        return Ok(());
    }

    let catalog = EmulatorCatalog::default();
    if !config.emulator_paths.is_empty() {
        writeln!(out, "{}", "Emulator paths:".bold())?;
        for (id, paths) in &config.emulator_paths {
            let known = catalog.get(id).is_some();
            for path in paths {
                write!(out, "  {}: ", id)?;
                write_path(out, fs, host, path)?;
                if !known {
                    write!(out, " {}", "(unknown emulator)".red())?;
                }
                writeln!(out)?;
            }
        }
    }

    for (title, paths) in [
        ("Scan directories:", &config.scan_dirs),
        ("Ignored directories:", &config.ignore_dirs),
    ] {
        if paths.is_empty() {
            continue;
        }
        writeln!(out, "{}", title.bold())?;
        for path in paths {
            write!(out, "  ")?;
            write_path(out, fs, host, path)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

fn write_path<W: Write, F: FileSystem>(
    out: &mut W,
    fs: &F,
    host: &HostEnvironment,
    path: &Path,
) -> io::Result<()> {
    let resolved = resolve_user_path(path, host.home());
    write!(out, "{}", resolved.display())?;
    if !fs.exists(&resolved).unwrap_or(false) {
        write!(out, " {}", "(not found)".red())?;
    }
    Ok(())
}
