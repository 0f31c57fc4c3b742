use std::collections::BTreeSet;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use owo_colors::OwoColorize;
use tracing::{debug, error, info, instrument};

use crate::cli::SyncArgs;
use crate::config::{Config, ConfigError, load_config_file};
use crate::emulator::DetectedEmulator;
use crate::file_system::{FileSystem, HostFs};
use crate::host::HostEnvironment;
use crate::inventory::{Inventory, collect_inventory};

pub const RCLONE: &str = "rclone";
/// Remote folder name for a save path without a final component.
const FALLBACK_FOLDER: &str = "saves";

#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    #[error("Unable to load configuration file. See details for more information: {inner}")]
    ConfigError {
        #[from]
        inner: ConfigError,
    },
    #[error("rclone is not installed. Get it from https://rclone.org/downloads/")]
    RcloneNotFound,
    #[error("No remote configured. Run `rclone config` and set `remote` in the configuration file.")]
    MissingRemote,
    #[error("Remote '{remote}' is not known to rclone. Configured remotes: {known}")]
    UnknownRemote { remote: String, known: String },
    #[error("Emulator '{0}' was not detected on this machine")]
    EmulatorNotDetected(String),
    #[error("Unable to run rclone: {inner}")]
    CannotRun {
        #[from]
        inner: io::Error,
    },
    #[error("rclone failed: {0}")]
    RcloneFailed(String),
    #[error("{failed} of {total} transfers failed")]
    TransfersFailed { failed: usize, total: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Push,
    Pull,
}

/// One `rclone sync` invocation between a save directory and its remote copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    pub emulator_id: String,
    pub local: PathBuf,
    pub remote: String,
    /// rclone filter patterns, rooted at `local`, for ignored directories inside it.
    pub excludes: Vec<String>,
}

impl SyncJob {
    pub fn args(&self, direction: Direction, dry_run: bool) -> Vec<OsString> {
        let local = OsString::from(self.local.as_os_str());
        let remote = OsString::from(&self.remote);
        let (source, destination) = match direction {
            Direction::Push => (local, remote),
            Direction::Pull => (remote, local),
        };

        let mut args = vec![OsString::from("sync"), source, destination];
        for pattern in &self.excludes {
            args.push(OsString::from("--exclude"));
            args.push(OsString::from(pattern));
        }
        if dry_run {
            args.push(OsString::from("--dry-run"));
        }
        args
    }
}

#[derive(Debug, Clone, Default)]
pub struct RcloneOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

pub trait Rclone {
    fn run(&self, args: &[OsString]) -> Result<RcloneOutput, SyncError>;
}

pub struct RcloneCli {
    executable: PathBuf,
}

impl RcloneCli {
    pub fn locate() -> Result<Self, SyncError> {
        let executable = which::which(RCLONE).map_err(|_| SyncError::RcloneNotFound)?;
        debug!("Using rclone at {}", executable.display());
        Ok(Self { executable })
    }
}

impl Rclone for RcloneCli {
    fn run(&self, args: &[OsString]) -> Result<RcloneOutput, SyncError> {
        debug!("Running rclone with {:?}", args);
        let output = Command::new(&self.executable).args(args).output()?;
        Ok(RcloneOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// `--exclude` pattern matching everything under `relative`.
fn exclude_pattern(relative: &Path) -> String {
    let components = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    format!("/{}/**", components.join("/"))
}

/// Remote names from `rclone listremotes`, without the trailing colon.
pub fn parse_remotes(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.trim_end_matches(':').to_string())
        .collect()
}

/// Save paths of `emulator` that are not inside another of its save paths.
fn top_level_paths(emulator: &DetectedEmulator) -> Vec<&Path> {
    let paths = emulator.save_paths();
    paths
        .iter()
        .filter(|p| !paths.iter().any(|other| other != *p && p.starts_with(other)))
        .map(PathBuf::as_path)
        .collect()
}

/// Jobs for every detected emulator, or for `only` when given.
///
/// Each save path maps to `<remote>:<sync_root>/<id>/<folder name>`. Folder
/// names repeated within an emulator get a numeric suffix.
pub fn plan_jobs(
    inventory: &Inventory,
    remote: &str,
    sync_root: &str,
    only: Option<&str>,
) -> Result<Vec<SyncJob>, SyncError> {
    let emulators: Vec<&DetectedEmulator> = match only {
        Some(id) => vec![
            inventory
                .emulators
                .get(id)
                .ok_or_else(|| SyncError::EmulatorNotDetected(id.to_string()))?,
        ],
        None => inventory.emulators.values().collect(),
    };
    let sync_root = sync_root.trim_matches('/');

    let mut jobs = vec![];
    for emulator in emulators {
        let mut used = BTreeSet::new();
        for local in top_level_paths(emulator) {
            if inventory.is_ignored(local) {
                continue;
            }
            let base = local
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| FALLBACK_FOLDER.to_string());
            let mut folder = base.clone();
            let mut suffix = 2;
            while !used.insert(folder.clone()) {
                folder = format!("{base}-{suffix}");
                suffix += 1;
            }

            let remote_path = if sync_root.is_empty() {
                format!("{remote}:{}/{folder}", emulator.id())
            } else {
                format!("{remote}:{sync_root}/{}/{folder}", emulator.id())
            };
            let excludes = inventory
                .ignored_below(local)
                .map(exclude_pattern)
                .collect::<Vec<_>>();
            if !excludes.is_empty() {
                debug!("Excluding {:?} from {}", excludes, local.display());
            }
            jobs.push(SyncJob {
                emulator_id: emulator.id().to_string(),
                local: local.to_path_buf(),
                remote: remote_path,
                excludes,
            });
        }
    }
    Ok(jobs)
}

pub fn sync(args: &SyncArgs, host: &HostEnvironment) -> Result<(), SyncError> {
    let config = load_config_file(&host.home_or_empty(), args.shared.config.as_deref())?;
    let rclone = RcloneCli::locate()?;
    sync_inner(&mut io::stdout(), &HostFs, host, &config, args, &rclone)
}

#[instrument(level = "debug", skip_all)]
fn sync_inner<W: Write, F: FileSystem, R: Rclone>(
    out: &mut W,
    fs: &F,
    host: &HostEnvironment,
    config: &Config,
    args: &SyncArgs,
    rclone: &R,
) -> Result<(), SyncError> {
    let remote = config.remote.as_deref().ok_or(SyncError::MissingRemote)?;
    let listing = rclone.run(&[OsString::from("listremotes")])?;
    if !listing.success {
        return Err(SyncError::RcloneFailed(listing.stderr.trim().to_string()));
    }
    let known = parse_remotes(&listing.stdout);
    if !known.iter().any(|r| r == remote) {
        return Err(SyncError::UnknownRemote {
            remote: remote.to_string(),
            known: known.join(", "),
        });
    }

    let mut host = host.clone();
    host.force_emudeck |= args.force_emudeck;
    let inventory = collect_inventory(fs, &host, config);
    let jobs = plan_jobs(&inventory, remote, &config.sync_root, args.emulator.as_deref())?;
    if jobs.is_empty() {
        writeln!(out, "{}", "Nothing to sync.".yellow())?;
        return Ok(());
    }

    let direction = if args.pull {
        Direction::Pull
    } else {
        Direction::Push
    };
    let mut failed = 0;
    for job in &jobs {
        let (from, to) = match direction {
            Direction::Push => (job.local.display().to_string(), job.remote.clone()),
            Direction::Pull => (job.remote.clone(), job.local.display().to_string()),
        };
        writeln!(out, "{} {} -> {}", job.emulator_id.bold(), from, to.green())?;

        let output = rclone.run(&job.args(direction, args.dry_run))?;
        if output.success {
            info!("Synced {} with {}", job.local.display(), job.remote);
        } else {
            failed += 1;
            error!("rclone sync of {} failed: {}", job.local.display(), output.stderr.trim());
            writeln!(out, "  {} {}", "failed:".red(), output.stderr.trim())?;
        }
    }

    if failed > 0 {
        return Err(SyncError::TransfersFailed {
            failed,
            total: jobs.len(),
        });
    }
    if args.dry_run {
        writeln!(out, "\nDry run, nothing was transferred.")?;
    } else {
        writeln!(out, "\n{}", "Sync finished.".bold())?;
    }
    Ok(())
}
