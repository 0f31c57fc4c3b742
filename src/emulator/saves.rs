use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::emulator::catalog::EmulatorCatalog;
use crate::emulator::detector::DetectedEmulator;
use crate::file_system::FileSystem;

/// A file found by a deep scan, attributed to the emulator owning its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFileRecord {
    pub path: PathBuf,
    pub emulator_id: &'static str,
}

/// Every save file below the save paths of `emulator`.
///
/// Files are kept when their extension is one of the emulator's save
/// extensions, case-insensitively. Overlapping save paths report a file once.
#[instrument(level = "debug", skip(fs, emulator), fields(emulator = emulator.id()))]
pub fn find_save_files<F: FileSystem>(fs: &F, emulator: &DetectedEmulator) -> Vec<PathBuf> {
    let mut seen = BTreeSet::new();
    let mut files = vec![];

    for save_path in emulator.save_paths() {
        for file in fs.walk_files(save_path) {
            if emulator.definition.is_save_file(&file) && seen.insert(file.clone()) {
                files.push(file);
            }
        }
    }

    info!("Found {} save files for {}", files.len(), emulator.name());
    files
}

/// Attributes every file below `directory` to the first catalog emulator
/// claiming its extension. Files no emulator claims are skipped.
pub fn deep_scan_records<F: FileSystem>(
    fs: &F,
    catalog: &EmulatorCatalog,
    directory: &Path,
) -> Vec<SaveFileRecord> {
    fs.walk_files(directory)
        .into_iter()
        .filter_map(|path| match catalog.owner_of(&path) {
            Some(owner) => Some(SaveFileRecord {
                path,
                emulator_id: owner.id,
            }),
            None => {
                debug!("No emulator claims {}", path.display());
                None
            }
        })
        .collect()
}

/// Deep scan grouped by emulator id. Emulators without files are absent.
#[instrument(level = "debug", skip(fs, catalog))]
pub fn deep_scan_directory<F: FileSystem>(
    fs: &F,
    catalog: &EmulatorCatalog,
    directory: &Path,
) -> BTreeMap<String, Vec<PathBuf>> {
    info!("Deep scanning directory: {}", directory.display());

    let mut grouped: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for record in deep_scan_records(fs, catalog, directory) {
        grouped
            .entry(record.emulator_id.to_string())
            .or_default()
            .push(record.path);
    }

    info!(
        "Deep scan of {} matched {} emulators",
        directory.display(),
        grouped.len()
    );
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files_db::FilesDB;

    fn detected(id: &str, save_paths: &[&str]) -> DetectedEmulator {
        let catalog = EmulatorCatalog::default();
        DetectedEmulator::new(
            catalog.get(id).unwrap().clone(),
            save_paths.iter().map(PathBuf::from).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_find_save_files_filters_by_extension() {
        let mut db = FilesDB::new();
        db.add_file("/saves/game1.sav", "")
            .add_file("/saves/game1.txt", "")
            .add_file("/saves/sub/game2.sav", "");

        let files = find_save_files(&db, &detected("retroarch", &["/saves"]));

        assert_eq!(
            files,
            vec![PathBuf::from("/saves/game1.sav"), PathBuf::from("/saves/sub/game2.sav")]
        );
    }

    #[test]
    fn test_find_save_files_ignores_extension_case() {
        let mut db = FilesDB::new();
        db.add_file("/saves/Zelda.SRM", "");

        let files = find_save_files(&db, &detected("retroarch", &["/saves"]));

        assert_eq!(files, vec![PathBuf::from("/saves/Zelda.SRM")]);
    }

    #[test]
    fn test_overlapping_save_paths_report_files_once() {
        let mut db = FilesDB::new();
        db.add_file("/emu/saves/retroarch/saves/mario.srm", "")
            .add_file("/emu/saves/retroarch/top.srm", "");

        let files = find_save_files(
            &db,
            &detected(
                "retroarch",
                &["/emu/saves/retroarch/saves", "/emu/saves/retroarch"],
            ),
        );

        assert_eq!(
            files,
            vec![
                PathBuf::from("/emu/saves/retroarch/saves/mario.srm"),
                PathBuf::from("/emu/saves/retroarch/top.srm"),
            ]
        );
    }

    #[test]
    fn test_unreadable_save_path_is_skipped() {
        let mut db = FilesDB::new();
        db.add_file("/a/one.srm", "")
            .add_file("/b/two.srm", "")
            .deny("/a");

        let files = find_save_files(&db, &detected("retroarch", &["/a", "/b"]));

        assert_eq!(files, vec![PathBuf::from("/b/two.srm")]);
    }

    #[test]
    fn test_deep_scan_groups_by_owner() {
        let mut db = FilesDB::new();
        db.add_file("/dump/a.srm", "")
            .add_file("/dump/b.gci", "")
            .add_file("/dump/readme.md", "");
        let catalog = EmulatorCatalog::default();

        let grouped = deep_scan_directory(&db, &catalog, Path::new("/dump"));

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["retroarch"], vec![PathBuf::from("/dump/a.srm")]);
        assert_eq!(grouped["dolphin"], vec![PathBuf::from("/dump/b.gci")]);
    }

    #[test]
    fn test_shared_extension_lands_in_one_bucket() {
        let mut db = FilesDB::new();
        db.add_file("/dump/x.sav", "");
        let catalog = EmulatorCatalog::default();

        let grouped = deep_scan_directory(&db, &catalog, Path::new("/dump"));

        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["retroarch"], vec![PathBuf::from("/dump/x.sav")]);
    }

    #[test]
    fn test_deep_scan_of_missing_directory_is_empty() {
        let db = FilesDB::new();
        let catalog = EmulatorCatalog::default();

        assert!(deep_scan_directory(&db, &catalog, Path::new("/missing")).is_empty());
    }
}
