use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Setting this variable to any non-empty value forces EmuDeck detection.
pub const FORCE_EMUDECK_ENV: &str = "FORCE_EMUDECK_PLATFORM";

/// Drive letters probed for a Windows `Emulation` folder, most preferred first.
pub const EMULATION_DRIVES: [&str; 3] = ["E:", "D:", "C:"];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    MacOs,
    Linux,
}

impl OsFamily {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OsFamily::Windows
        } else if cfg!(target_os = "macos") {
            OsFamily::MacOs
        } else {
            OsFamily::Linux
        }
    }
}

/// Facts about the host that detection depends on besides the filesystem.
#[derive(Clone, Debug)]
pub struct HostEnvironment {
    pub os: OsFamily,
    pub home: Option<PathBuf>,
    pub force_emudeck: bool,
}

impl HostEnvironment {
    pub fn from_env() -> Self {
        let home = home::home_dir()
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| non_empty_var("HOME").map(PathBuf::from))
            .or_else(|| non_empty_var("USERPROFILE").map(PathBuf::from));
        if home.is_none() {
            debug!("Unable to resolve the home directory, using an empty prefix");
        }

        Self {
            os: OsFamily::current(),
            home,
            force_emudeck: non_empty_var(FORCE_EMUDECK_ENV).is_some(),
        }
    }

    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Home directory, or an empty path when it couldn't be resolved.
    pub fn home_or_empty(&self) -> PathBuf {
        self.home.clone().unwrap_or_default()
    }

    pub fn is_windows(&self) -> bool {
        self.os == OsFamily::Windows
    }
}

/// Root of a Windows drive, e.g. `E:\`.
pub fn drive_root(drive: &str) -> PathBuf {
    PathBuf::from(format!("{drive}\\"))
}

fn non_empty_var(key: &str) -> Option<OsString> {
    env::var_os(key).filter(|v| !v.is_empty())
}
