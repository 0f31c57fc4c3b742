use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use humansize::{DECIMAL, format_size};
use owo_colors::OwoColorize;
use tabled::settings::object::{Cell, Rows};
use tabled::settings::{Alignment, Color, Modify, Panel, Style};
use tabled::{Table, Tabled};
use tracing::instrument;

use crate::emulator::{DetectedEmulator, EmulatorCatalog};
use crate::file_info::{FileInfo, SavesSummary};
use crate::platform::PlatformDescriptor;
use crate::types::PlatformKind;

pub fn print_platform<W: Write>(out: &mut W, platform: &PlatformDescriptor) -> io::Result<()> {
    writeln!(out, "{} {}", "Platform:".bold(), platform.name.green())?;
    writeln!(out, "  Base directory: {}", platform.base_dir.display())?;
    writeln!(out, "  ROM directory:  {}", optional_path(&platform.rom_dir))?;
    writeln!(out, "  Save directory: {}", optional_path(&platform.save_dir))?;
    Ok(())
}

fn optional_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "unknown".dimmed().to_string())
}

/// Table of detected emulators. `save_files` adds per-emulator statistics.
#[instrument(level = "debug", skip_all)]
pub fn print_emulators<W: Write>(
    out: &mut W,
    emulators: &BTreeMap<String, DetectedEmulator>,
    save_files: Option<&BTreeMap<String, Vec<FileInfo>>>,
) -> io::Result<()> {
    if emulators.is_empty() {
        writeln!(out, "{}", "No emulators detected.".yellow())?;
        return Ok(());
    }

    let records = emulators
        .values()
        .map(|emulator| {
            let summary = save_files.map(|files| {
                files
                    .get(emulator.id())
                    .map(|f| f.iter().collect::<SavesSummary>())
                    .unwrap_or_default()
            });
            EmulatorRecord::new(emulator, summary)
        })
        .collect::<Vec<_>>();
    let total: u64 = records.iter().map(|r| r.size).sum();

    let mut table = Table::new(&records);
    table.with(Panel::header("Emulators"));
    if save_files.is_some() {
        table.with(Panel::footer(format_size(total, DECIMAL)));
        table.with(Modify::new(Rows::last()).with(Color::BOLD));
        table.with(Modify::new(Rows::last()).with(Alignment::right()));
    }
    table.with(Modify::new(Cell::new(0, 0)).with(Color::BOLD));
    table.with(Style::modern_rounded());
    writeln!(out, "{table}")?;

    Ok(())
}

/// Per-emulator listing of the files a deep scan attributed.
pub fn print_deep_scan<W: Write>(
    out: &mut W,
    directory: &std::path::Path,
    grouped: &BTreeMap<String, Vec<FileInfo>>,
) -> io::Result<()> {
    if grouped.is_empty() {
        writeln!(
            out,
            "{} {}",
            "No save files found in".yellow(),
            directory.display()
        )?;
        return Ok(());
    }

    let records = grouped
        .iter()
        .flat_map(|(id, files)| files.iter().map(|f| SaveFileRecord::new(id, f)))
        .collect::<Vec<_>>();
    let total: u64 = records.iter().map(|r| r.size).sum();

    let table = Table::new(records)
        .with(Panel::header(format!("Deep scan of {}", directory.display())))
        .with(Panel::footer(format_size(total, DECIMAL)))
        .with(Modify::new(Rows::last()).with(Color::BOLD))
        .with(Modify::new(Rows::last()).with(Alignment::right()))
        .with(Modify::new(Cell::new(0, 0)).with(Color::BOLD))
        .with(Style::modern_rounded())
        .to_string();
    writeln!(out, "{table}")?;

    for (id, files) in grouped {
        writeln!(out, "{}: {} files", id.bold(), files.len())?;
    }
    Ok(())
}

/// Catalog listing with the candidate paths of `kind`.
pub fn print_definitions<W: Write>(
    out: &mut W,
    catalog: &EmulatorCatalog,
    kind: PlatformKind,
) -> io::Result<()> {
    for definition in catalog.iter() {
        writeln!(
            out,
            "{} ({}): {}",
            definition.name.bold(),
            definition.id,
            definition.save_extensions.join(", ")
        )?;
        for path in definition.candidates(kind) {
            writeln!(out, "  {}", path.display().dimmed())?;
        }
    }
    Ok(())
}

#[derive(Tabled)]
struct EmulatorRecord {
    #[tabled(rename = "Emulator")]
    name: String,
    #[tabled(rename = "Save paths")]
    paths: String,
    #[tabled(rename = "Files", display("tabled::derive::display::option", ""))]
    count: Option<usize>,
    #[tabled(rename = "Last change", display("tabled::derive::display::option", ""))]
    time: Option<String>,
    #[tabled(rename = "Size", display("tabled::derive::display::option", ""))]
    human_size: Option<String>,
    #[tabled(skip)]
    size: u64,
}

impl EmulatorRecord {
    fn new(emulator: &DetectedEmulator, summary: Option<SavesSummary>) -> Self {
        Self {
            name: emulator.name().to_string(),
            paths: emulator
                .save_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join("\n"),
            count: summary.map(|s| s.count),
            time: summary.and_then(|s| s.newest).map(format_time),
            human_size: summary.map(|s| format_size(s.total_size, DECIMAL)),
            size: summary.map(|s| s.total_size).unwrap_or(0),
        }
    }
}

#[derive(Tabled)]
struct SaveFileRecord {
    #[tabled(rename = "Emulator")]
    emulator: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Last change", display("tabled::derive::display::option", ""))]
    time: Option<String>,
    #[tabled(rename = "Size")]
    human_size: String,
    #[tabled(skip)]
    size: u64,
}

impl SaveFileRecord {
    fn new(emulator: &str, info: &FileInfo) -> Self {
        Self {
            emulator: emulator.to_string(),
            path: info.path.display().to_string(),
            time: info.touched.map(format_time),
            human_size: format_size(info.size, DECIMAL),
            size: info.size,
        }
    }
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
