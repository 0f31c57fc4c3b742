use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use crate::types::PlatformKind;

/// Result of platform detection. Exactly one is produced per detection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub kind: PlatformKind,
    pub name: String,
    pub base_dir: PathBuf,
    /// Only set when verified to exist, `None` means unknown.
    pub rom_dir: Option<PathBuf>,
    /// Only set when verified to exist, `None` means unknown.
    pub save_dir: Option<PathBuf>,
}

impl Display for PlatformDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.base_dir.display())
    }
}

// EmuDeck
pub const EMUDECK_DECK_MARKERS: [&str; 2] = ["/home/deck/emudeck", "/home/deck/.emudeck"];
pub const EMUDECK_HOME_MARKERS: [&str; 5] = [
    "emudeck",
    ".emudeck",
    "EmuDeck",
    "AppData/Roaming/EmuDeck",
    "Documents/EmuDeck",
];
pub const EMUDECK_MARKER_DRIVES: [&str; 4] = ["C:", "D:", "E:", "F:"];
pub const EMUDECK_INSTALLER_SCRIPT: &str = "EmuDeck.ps1";
pub const EMUDECK_STRUCTURE_FOLDERS: [&str; 4] = ["roms", "saves", "tools", "storage"];
pub const EMUDECK_STRUCTURE_MIN_MATCHES: usize = 2;
pub const EMULATION_DIR: &str = "Emulation";

// RetroPie
pub const RETROPIE_MARKERS: [&str; 2] = ["/opt/retropie", "/home/pi/RetroPie"];

// Batocera
pub const BATOCERA_MARKERS: [&str; 2] = ["/userdata", "/usr/batocera"];
pub const BATOCERA_USERDATA: &str = "/userdata";

// Lakka
pub const LAKKA_MARKER: &str = "/etc/lakka-version";
pub const LAKKA_STORAGE: &str = "/storage";

// EmulationStation
pub const EMULATIONSTATION_HOME_MARKER: &str = ".emulationstation";
pub const EMULATIONSTATION_MARKERS: [&str; 2] = ["/etc/emulationstation", "C:\\EmulationStation"];
pub const EMULATIONSTATION_WINDOWS_ROMS: &str = "C:\\ROMs";

// SteamOS and Bazzite
pub const OS_RELEASE: &str = "/etc/os-release";
pub const BAZZITE_RELEASE_MARKER: &str = "Bazzite";
pub const STEAMOS_RELEASE_MARKER: &str = "SteamOS";

// Generic fallback
pub const GENERIC_BASE_NAMES: [&str; 2] = ["Emulation", "Emulators"];
pub const GENERIC_ROM_DIRS: [&str; 4] = ["roms", "ROMs", "games", "Games"];
pub const GENERIC_SAVE_DIRS: [&str; 6] = ["saves", "save", "SaveData", "SaveFiles", "SaveGames", "Saves"];
pub const GENERIC_UNIX_FALLBACK: &str = ".local/share/cloudsaver";

// Relative to the home directory
pub const RETROARCH_LINUX_SAVES: &str = ".config/retroarch/saves";
pub const RETROARCH_WINDOWS_SAVES: &str = "AppData/Roaming/RetroArch/saves";
