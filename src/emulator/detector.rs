use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::emulator::catalog::{EmulatorCatalog, EmulatorDefinition};
use crate::emulator::scanner::DirectoryScanner;
use crate::file_system::FileSystem;
use crate::host::{EMULATION_DRIVES, HostEnvironment, drive_root};
use crate::paths::{expand_path, is_drive_rooted};
use crate::platform::PlatformDescriptor;
use crate::platform::catalog::EMULATION_DIR;
use crate::types::PlatformKind;

/// Folder under an EmuDeck base holding emulator installs.
const EMUDECK_EMULATORS_DIR: &str = "emulators";

/// An emulator whose save locations exist on this host.
///
/// `save_paths` is never empty and keeps the catalog order of candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedEmulator {
    pub definition: EmulatorDefinition,
    save_paths: Vec<PathBuf>,
}

impl DetectedEmulator {
    /// `None` when no save path survived.
    pub fn new(definition: EmulatorDefinition, save_paths: Vec<PathBuf>) -> Option<Self> {
        if save_paths.is_empty() {
            return None;
        }
        Some(Self {
            definition,
            save_paths,
        })
    }

    pub fn id(&self) -> &'static str {
        self.definition.id
    }

    pub fn name(&self) -> &'static str {
        self.definition.name
    }

    pub fn save_paths(&self) -> &[PathBuf] {
        &self.save_paths
    }

    /// Appends a save path unless already listed.
    pub fn add_save_path(&mut self, path: PathBuf) -> bool {
        if self.save_paths.contains(&path) {
            return false;
        }
        self.save_paths.push(path);
        true
    }

    /// Drops the save paths matching `predicate`, `None` when nothing is left.
    pub fn without_paths<P: Fn(&Path) -> bool>(self, predicate: P) -> Option<Self> {
        let save_paths = self
            .save_paths
            .into_iter()
            .filter(|p| !predicate(p))
            .collect();
        Self::new(self.definition, save_paths)
    }
}

/// Resolves which catalog emulators have save data on this host.
///
/// The detector owns its catalog. [`EmulatorDetector::scan_directory`] enriches
/// it permanently, while the scans implied by a platform during
/// [`EmulatorDetector::detect_emulators`] only enrich a copy for that run.
pub struct EmulatorDetector<'a, F: FileSystem> {
    fs: &'a F,
    host: &'a HostEnvironment,
    catalog: EmulatorCatalog,
}

impl<'a, F: FileSystem> EmulatorDetector<'a, F> {
    pub fn new(fs: &'a F, host: &'a HostEnvironment) -> Self {
        Self::with_catalog(fs, host, EmulatorCatalog::default())
    }

    pub fn with_catalog(fs: &'a F, host: &'a HostEnvironment, catalog: EmulatorCatalog) -> Self {
        Self { fs, host, catalog }
    }

    pub fn catalog(&self) -> &EmulatorCatalog {
        &self.catalog
    }

    /// Runs the directory-scanning heuristic against the detector's catalog.
    ///
    /// Returns the count of candidate paths added. A root that does not exist
    /// changes nothing.
    pub fn scan_directory(&mut self, root: &Path, kind: PlatformKind) -> usize {
        DirectoryScanner::new(self.fs).scan(&mut self.catalog, root, kind)
    }

    /// Emulators with at least one existing save location, keyed by id.
    #[instrument(level = "debug", skip(self, platform), fields(platform = %platform.kind))]
    pub fn detect_emulators(&self, platform: &PlatformDescriptor) -> BTreeMap<String, DetectedEmulator> {
        info!("Detecting emulators for platform: {}", platform.name);

        let mut catalog = self.catalog.clone();
        self.scan_platform_roots(&mut catalog, platform);

        let mut detected = BTreeMap::new();
        for definition in catalog.iter() {
            let save_paths = self.existing_candidates(definition, platform.kind);
            match DetectedEmulator::new(definition.clone(), save_paths) {
                Some(emulator) => {
                    info!(
                        "Detected {} with {} save paths",
                        emulator.name(),
                        emulator.save_paths().len()
                    );
                    detected.insert(emulator.id().to_string(), emulator);
                }
                None => debug!("No save paths found for {}", definition.name),
            }
        }

        detected
    }

    fn existing_candidates(&self, definition: &EmulatorDefinition, kind: PlatformKind) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = vec![];
        for candidate in definition.candidates(kind) {
            let path = expand_path(candidate, self.host.home());
            if found.contains(&path) {
                continue;
            }
            match self.fs.exists(&path) {
                Ok(true) => {
                    debug!("Found save path for {}: {}", definition.id, path.display());
                    found.push(path);
                }
                Ok(false) => {}
                Err(e) => debug!("Error checking path {}: {}", path.display(), e),
            }
        }
        found
    }

    /// Drive-rooted EmuDeck and generic layouts get their folders scanned.
    fn scan_platform_roots(&self, catalog: &mut EmulatorCatalog, platform: &PlatformDescriptor) {
        if !is_drive_rooted(&platform.base_dir) {
            return;
        }
        let scanner = DirectoryScanner::new(self.fs);

        match platform.kind {
            PlatformKind::EmuDeck => {
                if let Some(save_dir) = &platform.save_dir {
                    scanner.scan(catalog, save_dir, platform.kind);
                }
                scanner.scan(catalog, &platform.base_dir, platform.kind);

                let emulators = platform.base_dir.join(EMUDECK_EMULATORS_DIR);
                if self.exists(&emulators) {
                    scanner.scan(catalog, &emulators, platform.kind);
                }
            }
            PlatformKind::Generic => {
                scanner.scan(catalog, &platform.base_dir, platform.kind);

                let base = platform.base_dir.to_string_lossy().to_uppercase();
                for drive in EMULATION_DRIVES {
                    if base.contains(drive) {
                        continue;
                    }
                    let other = drive_root(drive).join(EMULATION_DIR);
                    if self.exists(&other) {
                        scanner.scan(catalog, &other, platform.kind);
                    }
                }
            }
            _ => {}
        }
    }

    fn exists(&self, path: &Path) -> bool {
        match self.fs.exists(path) {
            Ok(exists) => exists,
            Err(e) => {
                debug!("Error checking path {}: {}", path.display(), e);
                false
            }
        }
    }
}
