use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::ops::Bound;
use std::path::{Path, PathBuf};

use crate::file_info::FileInfo;
use crate::file_system::{DirItem, FileSystem};

#[derive(Debug, Clone)]
struct Node {
    is_dir: bool,
    content: String,
}

/// In-memory directory tree.
///
/// Paths are stored in a `BTreeMap`, which orders them component-wise, so a
/// subtree is always a contiguous range starting at its root.
#[derive(Debug, Default)]
pub struct FilesDB {
    files: BTreeMap<PathBuf, Node>,
    denied: BTreeSet<PathBuf>,
}

impl FilesDB {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dir<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.insert(path.as_ref(), true, String::new());
        self
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, content: &str) -> &mut Self {
        self.insert(path.as_ref(), false, content.to_string());
        self
    }

    /// Any probe of `path`, or of anything below it, fails with `PermissionDenied`.
    pub fn deny<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.denied.insert(path.as_ref().to_path_buf());
        self
    }

    fn insert(&mut self, path: &Path, is_dir: bool, content: String) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.files
                .entry(ancestor.to_path_buf())
                .or_insert_with(|| Node {
                    is_dir: true,
                    content: String::new(),
                });
        }
        self.files
            .insert(path.to_path_buf(), Node { is_dir, content });
    }

    fn check_access(&self, path: &Path) -> io::Result<()> {
        if let Some(denied) = path.ancestors().find(|a| self.denied.contains(*a)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("access to {} denied", denied.display()),
            ));
        }
        Ok(())
    }

    fn subtree<'a>(&'a self, root: &'a Path) -> impl Iterator<Item = (&'a PathBuf, &'a Node)> {
        self.files
            .range::<Path, _>((Bound::Excluded(root), Bound::Unbounded))
            .take_while(move |(p, _)| p.starts_with(root))
    }
}

impl FileSystem for FilesDB {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        self.check_access(path)?;
        Ok(self.files.contains_key(path))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.check_access(path)?;
        match self.files.get(path) {
            Some(node) if !node.is_dir => Ok(node.content.clone()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            )),
            None => Err(io::ErrorKind::NotFound.into()),
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirItem>> {
        self.check_access(path)?;
        match self.files.get(path) {
            Some(node) if node.is_dir => {}
            Some(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} is not a directory", path.display()),
                ));
            }
            None => return Err(io::ErrorKind::NotFound.into()),
        }

        Ok(self
            .subtree(path)
            .filter(|(p, _)| p.parent() == Some(path))
            .map(|(p, node)| DirItem {
                path: p.clone(),
                name: p
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                is_dir: node.is_dir,
            })
            .collect())
    }

    fn walk_files(&self, root: &Path) -> Vec<PathBuf> {
        if self.check_access(root).is_err() {
            return vec![];
        }
        self.subtree(root)
            .filter(|(p, node)| {
                !node.is_dir && !p.ancestors().any(|a| self.denied.contains(a))
            })
            .map(|(p, _)| p.clone())
            .collect()
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        self.check_access(path)?;
        match self.files.get(path) {
            Some(node) => Ok(FileInfo {
                path: path.to_path_buf(),
                size: node.content.len() as u64,
                touched: None,
            }),
            None => Err(io::ErrorKind::NotFound.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_test_structure() -> FilesDB {
        let mut db = FilesDB::new();
        db.add_file("/foo/a.txt", "a")
            .add_dir("/foo/bar/empty")
            .add_file("/foo/baz/b.txt", "b");
        db
    }

    #[test]
    fn exists() {
        let db = build_test_structure();

        assert_eq!(db.exists(Path::new("/foo/baz/b.txt")).unwrap(), true);
        assert_eq!(db.exists(Path::new("/foo/baz/c.txt")).unwrap(), false);
        assert_eq!(db.exists(Path::new("/foo/baz/")).unwrap(), true);
        assert_eq!(db.exists(Path::new("/foo")).unwrap(), true);
    }

    #[test]
    fn read_dir() {
        let db = build_test_structure();
        let items = db.read_dir(Path::new("/foo")).unwrap();

        let paths = items.iter().map(|i| i.path.clone()).collect::<Vec<_>>();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/foo/a.txt"),
                PathBuf::from("/foo/bar"),
                PathBuf::from("/foo/baz")
            ]
        );
        assert_eq!(items[0].is_dir, false);
        assert_eq!(items[1].name, "bar");
        assert_eq!(items[1].is_dir, true);
        assert!(db.read_dir(Path::new("/foo/a.txt")).is_err());
        assert!(db.read_dir(Path::new("/missing")).is_err());
    }

    #[test]
    fn walk_files() {
        let db = build_test_structure();

        assert_eq!(
            db.walk_files(Path::new("/foo")),
            vec![PathBuf::from("/foo/a.txt"), PathBuf::from("/foo/baz/b.txt")]
        );
        assert_eq!(
            db.walk_files(Path::new("/foo/baz")),
            vec![PathBuf::from("/foo/baz/b.txt")]
        );
    }

    #[test]
    fn denied_paths_fail_probes() {
        let mut db = build_test_structure();
        db.deny("/foo/baz");

        assert!(db.exists(Path::new("/foo/baz")).is_err());
        assert!(db.read_dir(Path::new("/foo/baz")).is_err());
        assert!(db.exists(Path::new("/foo/baz/b.txt")).is_err());
        assert!(db.read_to_string(Path::new("/foo/baz/b.txt")).is_err());
        assert_eq!(db.exists(Path::new("/foo/a.txt")).unwrap(), true);
        assert_eq!(
            db.walk_files(Path::new("/foo")),
            vec![PathBuf::from("/foo/a.txt")]
        );
    }

    #[test]
    fn read_to_string() {
        let db = build_test_structure();

        assert_eq!(db.read_to_string(Path::new("/foo/a.txt")).unwrap(), "a");
        assert!(db.read_to_string(Path::new("/foo/bar")).is_err());
    }

    #[test]
    fn stat_reports_content_size() {
        let mut db = build_test_structure();
        db.add_file("/foo/save.srm", "0123456789").deny("/foo/bar");

        assert_eq!(db.stat(Path::new("/foo/save.srm")).unwrap().size, 10);
        assert!(db.stat(Path::new("/foo/missing.srm")).is_err());
        assert!(db.stat(Path::new("/foo/bar")).is_err());
    }
}
