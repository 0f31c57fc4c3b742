use std::path::Path;

use tracing::{debug, error, info, instrument};

use crate::emulator::catalog::EmulatorCatalog;
use crate::file_system::{DirItem, FileSystem};
use crate::types::PlatformKind;

/// Frontend-style folder holding one directory per emulator, e.g. `Emulation/saves`.
pub const EMULATOR_SAVES_DIR: &str = "saves";
/// Accepted names, compared exactly, of a save folder nested in an emulator folder.
pub const SAVE_SUBFOLDER_NAMES: [&str; 4] = ["save", "saves", "savegames", "memcards"];
/// Folders below a root that commonly group emulator folders.
pub const SAVE_ROOT_NAMES: [&str; 6] = ["saves", "save", "SaveData", "SaveFiles", "SaveGames", "Emulators"];
/// Keywords, matched as substrings, of save folders inside an emulator install.
pub const SAVE_FOLDER_KEYWORDS: [&str; 4] = ["save", "saves", "savegames", "savedata"];

/// Loose match of a directory name against an emulator id.
///
/// Substring containment, case-insensitive: `retroarch-saves` matches
/// `retroarch`. Unrelated folders that merely contain an id do match too.
pub fn fuzzy_match(dir_name: &str, emulator_id: &str) -> bool {
    dir_name
        .to_lowercase()
        .contains(&emulator_id.to_lowercase())
}

/// Exact, case-insensitive membership in [`SAVE_SUBFOLDER_NAMES`].
fn is_save_subfolder(name: &str) -> bool {
    let lower = name.to_lowercase();
    SAVE_SUBFOLDER_NAMES.contains(&lower.as_str())
}

/// Substring match against [`SAVE_FOLDER_KEYWORDS`], looser than [`is_save_subfolder`].
fn looks_like_save_folder(name: &str) -> bool {
    let lower = name.to_lowercase();
    SAVE_FOLDER_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Discovers emulator save folders missing from the catalog by their names.
///
/// Every discovered path is appended, deduplicated, to the catalog it is
/// given. Each filesystem operation handles its own failure, so one unreadable
/// directory never stops the scan of its siblings.
pub struct DirectoryScanner<'a, F: FileSystem> {
    fs: &'a F,
}

impl<'a, F: FileSystem> DirectoryScanner<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Scans `root` and returns the count of newly added candidate paths.
    ///
    /// Folders found in `root/saves` are added for `kind`, everything else is
    /// added to the generic candidates.
    #[instrument(level = "debug", skip(self, catalog))]
    pub fn scan(&self, catalog: &mut EmulatorCatalog, root: &Path, kind: PlatformKind) -> usize {
        info!("Scanning custom directory: {}", root.display());

        let mut added = self.scan_emulator_saves(catalog, root, kind);
        added += self.scan_save_roots(catalog, root);
        added += self.scan_root_entries(catalog, root);

        debug!("Added {} candidate paths from {}", added, root.display());
        added
    }

    /// `root/saves/<emulator>` and its nested save folder.
    fn scan_emulator_saves(
        &self,
        catalog: &mut EmulatorCatalog,
        root: &Path,
        kind: PlatformKind,
    ) -> usize {
        let saves = root.join(EMULATOR_SAVES_DIR);
        if !self.exists(&saves) {
            return 0;
        }
        debug!("Found emulator saves directory: {}", saves.display());

        let entries = match self.fs.read_dir(&saves) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error scanning saves directory {}: {}", saves.display(), e);
                return 0;
            }
        };

        let mut added = 0;
        for entry in entries.into_iter().filter(|e| e.is_dir) {
            let ids = matching_ids(catalog, &entry.name);
            if ids.is_empty() {
                continue;
            }

            match self.fs.read_dir(&entry.path) {
                Ok(sub_entries) => {
                    for sub in sub_entries
                        .iter()
                        .filter(|s| s.is_dir && is_save_subfolder(&s.name))
                    {
                        debug!("Found save subdirectory: {}", sub.path.display());
                        for id in &ids {
                            added += add_candidate(catalog, id, kind, &sub.path);
                            added += add_candidate(catalog, id, kind, &entry.path);
                        }
                    }
                }
                Err(e) => debug!(
                    "Error scanning subdirectories of {}: {}",
                    entry.path.display(),
                    e
                ),
            }

            for id in &ids {
                added += add_candidate(catalog, id, kind, &entry.path);
            }
        }

        added
    }

    /// `root/<save root>/<emulator>` for every name in [`SAVE_ROOT_NAMES`].
    fn scan_save_roots(&self, catalog: &mut EmulatorCatalog, root: &Path) -> usize {
        let mut added = 0;
        for name in SAVE_ROOT_NAMES {
            let save_root = root.join(name);
            if !self.exists(&save_root) {
                continue;
            }
            debug!("Found custom save directory: {}", save_root.display());

            let entries = match self.fs.read_dir(&save_root) {
                Ok(entries) => entries,
                Err(e) => {
                    error!("Error scanning custom directory {}: {}", save_root.display(), e);
                    continue;
                }
            };
            for entry in entries.iter().filter(|e| e.is_dir) {
                for id in matching_ids(catalog, &entry.name) {
                    added += add_candidate(catalog, id, PlatformKind::Generic, &entry.path);
                }
            }
        }
        added
    }

    /// `root/<anything named after an emulator>` and save-looking folders inside.
    fn scan_root_entries(&self, catalog: &mut EmulatorCatalog, root: &Path) -> usize {
        if !self.exists(root) {
            return 0;
        }
        let entries = match self.fs.read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error scanning root directory {}: {}", root.display(), e);
                return 0;
            }
        };

        let mut added = 0;
        for entry in entries.iter().filter(|e| e.is_dir) {
            let ids = matching_ids(catalog, &entry.name);
            if ids.is_empty() {
                continue;
            }
            debug!("Found potential emulator directory: {}", entry.path.display());

            let save_folders = self.save_looking_folders(entry);
            for id in ids {
                added += add_candidate(catalog, id, PlatformKind::Generic, &entry.path);
                for folder in &save_folders {
                    added += add_candidate(catalog, id, PlatformKind::Generic, &folder.path);
                }
            }
        }
        added
    }

    fn save_looking_folders(&self, dir: &DirItem) -> Vec<DirItem> {
        match self.fs.read_dir(&dir.path) {
            Ok(entries) => entries
                .into_iter()
                .filter(|e| e.is_dir && looks_like_save_folder(&e.name))
                .collect(),
            Err(e) => {
                debug!("Error scanning subdirectories of {}: {}", dir.path.display(), e);
                vec![]
            }
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

fn matching_ids(catalog: &EmulatorCatalog, dir_name: &str) -> Vec<&'static str> {
    catalog
        .iter()
        .filter(|e| fuzzy_match(dir_name, e.id))
        .map(|e| e.id)
        .collect()
}

fn add_candidate(catalog: &mut EmulatorCatalog, id: &str, kind: PlatformKind, path: &Path) -> usize {
    let Some(definition) = catalog.get_mut(id) else {
        return 0;
    };
    if !definition.add_candidate(kind, path) {
        return 0;
    }
    debug!("Found custom path for {}: {}", id, path.display());
    1
}
