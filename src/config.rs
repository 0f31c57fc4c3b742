use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

pub const CONFIG_DIR: &str = ".config";
pub const CONFIG_FILE_NAME: &str = "cloudsaver.toml";
pub const HOME_CONFIG_FILE_NAME: &str = ".cloudsaver.toml";
pub const DEFAULT_SYNC_ROOT: &str = "cloudsaver";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file {} couldn't be read: {inner}", path.display())]
    CannotRead {
        path: PathBuf,
        inner: std::io::Error,
    },
    #[error("Configuration file {} is not valid: {inner}", path.display())]
    Invalid {
        path: PathBuf,
        inner: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// rclone remote name, without the trailing colon.
    pub remote: Option<String>,
    /// Folder on the remote holding one subfolder per emulator.
    pub sync_root: String,
    /// Extra save directories keyed by emulator id.
    pub emulator_paths: BTreeMap<String, Vec<PathBuf>>,
    /// Extra roots searched for emulator folders.
    pub scan_dirs: Vec<PathBuf>,
    /// Save paths and files below these are dropped.
    pub ignore_dirs: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: None,
            sync_root: DEFAULT_SYNC_ROOT.to_string(),
            emulator_paths: BTreeMap::new(),
            scan_dirs: vec![],
            ignore_dirs: vec![],
        }
    }
}

/// Possible config file locations, in lookup order.
pub fn get_config_file_candidates(home_dir: &Path) -> Vec<PathBuf> {
    vec![
        home_dir.join(CONFIG_DIR).join(CONFIG_FILE_NAME),
        home_dir.join(HOME_CONFIG_FILE_NAME),
        PathBuf::from(CONFIG_FILE_NAME),
    ]
}

pub fn find_config_file(home_dir: &Path) -> Option<PathBuf> {
    for candidate in get_config_file_candidates(home_dir) {
        debug!("Looking for a configuration file: {}", candidate.display());
        if candidate.exists() {
            return Some(candidate);
        }
    }

    None
}

/// Loads `explicit` when given, otherwise the first existing candidate.
///
/// A missing config file yields the defaults. An explicit file must exist.
pub fn load_config_file(home_dir: &Path, explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match find_config_file(home_dir) {
            Some(path) => path,
            None => {
                debug!("No configuration file found, using defaults");
                return Ok(Config::default());
            }
        },
    };

    info!("Using configuration file: {}", path.display());
    let data = fs::read_to_string(&path).map_err(|inner| ConfigError::CannotRead {
        path: path.clone(),
        inner,
    })?;

    toml::from_str(&data).map_err(|inner| ConfigError::Invalid { path, inner })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();

        let config = load_config_file(tmp.path(), None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.sync_root, "cloudsaver");
    }

    #[test]
    fn test_config_dir_candidate_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path();
        fs::create_dir_all(home.join(".config")).unwrap();
        fs::write(home.join(".config/cloudsaver.toml"), "remote = \"first\"").unwrap();
        fs::write(home.join(".cloudsaver.toml"), "remote = \"second\"").unwrap();

        let config = load_config_file(home, None).unwrap();
        assert_eq!(config.remote.as_deref(), Some("first"));
    }

    #[test]
    fn test_full_config_is_parsed() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path();
        let cfg_data = r#"
remote = "gdrive"
sync_root = "games/saves"
scan_dirs = ["/mnt/games"]
ignore_dirs = ["~/Emulation/saves/retroarch/old"]

[emulator_paths]
retroarch = ["~/Games/RetroArch/saves", "/opt/saves"]
        "#;
        fs::write(home.join(".cloudsaver.toml"), cfg_data).unwrap();

        let config = load_config_file(home, None).unwrap();
        assert_eq!(config.remote.as_deref(), Some("gdrive"));
        assert_eq!(config.sync_root, "games/saves");
        assert_eq!(config.scan_dirs, vec![PathBuf::from("/mnt/games")]);
        assert_eq!(config.emulator_paths["retroarch"].len(), 2);
    }

    #[test]
    fn test_explicit_config_is_used() {
        let tmp = tempfile::tempdir().unwrap();
        let explicit = tmp.path().join("custom.toml");
        fs::write(&explicit, "sync_root = \"elsewhere\"").unwrap();
        fs::write(tmp.path().join(".cloudsaver.toml"), "sync_root = \"ignored\"").unwrap();

        let config = load_config_file(tmp.path(), Some(&explicit)).unwrap();
        assert_eq!(config.sync_root, "elsewhere");
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let tmp = tempfile::tempdir().unwrap();

        let result = load_config_file(tmp.path(), Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::CannotRead { .. })));
    }

    #[test]
    fn test_invalid_config_fails() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(".cloudsaver.toml"), "Hello, World!").unwrap();

        let result = load_config_file(tmp.path(), None);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(".cloudsaver.toml"), "remotes = \"typo\"").unwrap();

        assert!(load_config_file(tmp.path(), None).is_err());
    }
}
