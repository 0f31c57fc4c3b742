use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::emulator::{DetectedEmulator, EmulatorDetector};
use crate::file_system::FileSystem;
use crate::host::HostEnvironment;
use crate::paths::resolve_user_path;
use crate::platform::{PlatformDescriptor, PlatformDetector};

/// Everything a detection run found, after applying the user configuration.
#[derive(Debug)]
pub struct Inventory {
    pub platform: PlatformDescriptor,
    pub emulators: BTreeMap<String, DetectedEmulator>,
    ignored: Vec<PathBuf>,
}

impl Inventory {
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.ignored.iter().any(|dir| path.starts_with(dir))
    }

    /// Ignored directories strictly inside `path`, relative to it.
    pub fn ignored_below<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Path> {
        self.ignored
            .iter()
            .filter_map(move |dir| dir.strip_prefix(path).ok())
            .filter(|relative| !relative.as_os_str().is_empty())
    }
}

/// Detects the platform and its emulators, then merges the configured paths.
///
/// `scan_dirs` feed the directory-scanning heuristic before detection,
/// `emulator_paths` that exist are appended to the matching emulator and
/// `ignore_dirs` drop save paths below them.
#[instrument(level = "debug", skip_all)]
pub fn collect_inventory<F: FileSystem>(fs: &F, host: &HostEnvironment, config: &Config) -> Inventory {
    let home = host.home();
    let platform = PlatformDetector::new(fs, host).detect();

    let mut detector = EmulatorDetector::new(fs, host);
    for dir in &config.scan_dirs {
        let root = resolve_user_path(dir, home);
        let added = detector.scan_directory(&root, platform.kind);
        debug!("Configured scan of {} added {} paths", root.display(), added);
    }

    let mut emulators = detector.detect_emulators(&platform);

    for (id, paths) in &config.emulator_paths {
        let Some(definition) = detector.catalog().get(id) else {
            warn!("Ignoring configured paths of unknown emulator: {}", id);
            continue;
        };
        for path in paths {
            let path = resolve_user_path(path, home);
            if !fs.exists(&path).unwrap_or(false) {
                debug!("Configured path for {} does not exist: {}", id, path.display());
                continue;
            }
            match emulators.get_mut(id) {
                Some(emulator) => {
                    emulator.add_save_path(path);
                }
                None => {
                    if let Some(emulator) = DetectedEmulator::new(definition.clone(), vec![path]) {
                        info!("Detected {} from configuration", emulator.name());
                        emulators.insert(id.clone(), emulator);
                    }
                }
            }
        }
    }

    let ignored = config
        .ignore_dirs
        .iter()
        .map(|dir| resolve_user_path(dir, home))
        .collect::<Vec<_>>();
    let emulators = emulators
        .into_iter()
        .filter_map(|(id, emulator)| {
            let kept = emulator.without_paths(|p| ignored.iter().any(|dir| p.starts_with(dir)));
            if kept.is_none() {
                debug!("Every save path of {} is ignored", id);
            }
            kept.map(|e| (id, e))
        })
        .collect();

    Inventory {
        platform,
        emulators,
        ignored,
    }
}
