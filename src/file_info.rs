use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Size and last change of a single save file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub touched: Option<SystemTime>,
}

impl TryFrom<&Path> for FileInfo {
    type Error = std::io::Error;

    fn try_from(p: &Path) -> Result<Self, Self::Error> {
        let metadata = fs::metadata(p).or(fs::symlink_metadata(p))?;
        Ok(Self {
            path: p.to_path_buf(),
            size: metadata.len(),
            touched: metadata.modified().ok(),
        })
    }
}

/// Aggregate over the save files of one emulator.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SavesSummary {
    pub count: usize,
    pub total_size: u64,
    pub newest: Option<SystemTime>,
}

impl<'a> FromIterator<&'a FileInfo> for SavesSummary {
    fn from_iter<T: IntoIterator<Item = &'a FileInfo>>(iter: T) -> Self {
        iter.into_iter().fold(Self::default(), |mut acc, info| {
            acc.count += 1;
            acc.total_size += info.size;
            acc.newest = acc.newest.max(info.touched);
            acc
        })
    }
}
