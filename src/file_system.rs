use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};
use tracing::{debug, warn};

use crate::file_info::FileInfo;

/// Immediate child of a directory as reported by [`FileSystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirItem {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

/// Read-only view of the filesystem used by the detection engine.
///
/// Every probe the engine makes goes through this trait, so detection can run
/// against the real disk ([`HostFs`]) or against an in-memory tree in tests.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> io::Result<bool>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Lists immediate children of `path`, sorted by name.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirItem>>;

    /// Lists every regular file below `root`, in sorted walk order.
    ///
    /// Unreadable subdirectories are logged and skipped; a missing root yields
    /// an empty list.
    fn walk_files(&self, root: &Path) -> Vec<PathBuf>;

    fn stat(&self, path: &Path) -> io::Result<FileInfo>;
}

#[derive(Default, Debug, Clone, Copy)]
pub struct HostFs;

impl FileSystem for HostFs {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirItem>> {
        let mut items = vec![];
        for entry in fs::read_dir(path)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry in {}: {}", path.display(), e);
                    continue;
                }
            };
            let item_path = entry.path();
            // Follows symlinks, emulation frontends link emulator folders into their saves tree
            let is_dir = fs::metadata(&item_path)
                .map(|m| m.is_dir())
                .unwrap_or(false);
            items.push(DirItem {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: item_path,
                is_dir,
            });
        }
        items.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(items)
    }

    fn walk_files(&self, root: &Path) -> Vec<PathBuf> {
        match root.try_exists() {
            Ok(true) => {}
            Ok(false) => {
                debug!("Nothing to walk, {} does not exist", root.display());
                return vec![];
            }
            Err(e) => {
                debug!("Unable to access {}: {}", root.display(), e);
                return vec![];
            }
        }

        WalkDir::new(root)
            .parallelism(Parallelism::Serial)
            .skip_hidden(false)
            .sort(true)
            .into_iter()
            .filter_map(|res| match res {
                Ok(de) => Some(de),
                Err(e) => {
                    warn!("Unable to read an entry below {}: {}", root.display(), e);
                    None
                }
            })
            .map(|de| (de.file_type(), de.path()))
            .filter(|(file_type, path)| {
                file_type.is_file() || (file_type.is_symlink() && is_linked_file(path))
            })
            .map(|(_, path)| path)
            .collect::<Vec<_>>()
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        FileInfo::try_from(path)
    }
}

/// Links to files count as save files. Links to directories are not descended
/// into, so a link cycle can't make the walk endless.
fn is_linked_file(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(metadata) => metadata.is_file(),
        Err(e) => {
            debug!("Dangling link {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_dir_is_sorted_and_marks_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("b_dir")).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("c.sav"), "c").unwrap();

        let items = HostFs.read_dir(root).unwrap();
        let names = items.iter().map(|i| i.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a.txt", "b_dir", "c.sav"]);
        assert_eq!(items[1].is_dir, true);
        assert_eq!(items[0].is_dir, false);
    }

    #[test]
    fn test_read_dir_of_missing_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(HostFs.read_dir(&tmp.path().join("missing")).is_err());
    }

    #[test]
    fn test_walk_files_is_recursive() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("top.srm"), "").unwrap();
        fs::write(root.join("sub/deeper/nested.srm"), "").unwrap();

        let files = HostFs.walk_files(root);
        assert_eq!(files.len(), 2);
        assert!(files.contains(&root.join("top.srm")));
        assert!(files.contains(&root.join("sub/deeper/nested.srm")));
    }

    #[test]
    fn test_walk_files_of_missing_root_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(HostFs.walk_files(&tmp.path().join("nope")).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_files_includes_linked_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("store")).unwrap();
        fs::create_dir_all(root.join("saves")).unwrap();
        fs::write(root.join("store/real.srm"), "data").unwrap();
        std::os::unix::fs::symlink(root.join("store/real.srm"), root.join("saves/linked.srm"))
            .unwrap();
        std::os::unix::fs::symlink(root.join("store/gone.srm"), root.join("saves/dangling.srm"))
            .unwrap();
        std::os::unix::fs::symlink(root, root.join("saves/loop")).unwrap();

        let files = HostFs.walk_files(&root.join("saves"));
        assert_eq!(files, vec![root.join("saves/linked.srm")]);
    }
}
