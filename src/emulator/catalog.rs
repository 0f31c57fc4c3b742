use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::PlatformKind;

/// Known emulator and where it keeps its saves on every platform.
#[derive(Debug, Clone, PartialEq)]
pub struct EmulatorDefinition {
    pub id: &'static str,
    pub name: &'static str,
    /// Candidate save directories per platform, may start with `~` or a drive letter.
    pub default_paths: BTreeMap<PlatformKind, Vec<PathBuf>>,
    /// Lowercase, with the leading dot.
    pub save_extensions: Vec<&'static str>,
    pub state_extensions: Vec<&'static str>,
    pub config_paths: Vec<PathBuf>,
}

impl EmulatorDefinition {
    /// Candidate paths for `kind`, or the generic list when `kind` has none.
    pub fn candidates(&self, kind: PlatformKind) -> &[PathBuf] {
        self.default_paths
            .get(&kind)
            .or_else(|| self.default_paths.get(&PlatformKind::Generic))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Case-insensitive match of the file extension against `save_extensions`.
    pub fn is_save_file(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.claims_extension(&ext))
    }

    pub fn claims_extension(&self, ext: &str) -> bool {
        self.save_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Appends `path` to the candidates of `kind` unless already listed.
    pub fn add_candidate(&mut self, kind: PlatformKind, path: &Path) -> bool {
        if !self.default_paths.contains_key(&kind) {
            // Keep the generic fallback visible for platforms without a table
            let seed = self.candidates(kind).to_vec();
            self.default_paths.insert(kind, seed);
        }
        let list = self.default_paths.entry(kind).or_default();
        if list.iter().any(|p| p == path) {
            return false;
        }
        list.push(path.to_path_buf());
        true
    }
}

/// Lowercased extension of `path` including the leading dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// Ordered table of emulator definitions.
///
/// Declaration order is significant: when several emulators claim the same
/// save extension, the first one in the catalog owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct EmulatorCatalog {
    entries: Vec<EmulatorDefinition>,
}

impl EmulatorCatalog {
    pub fn new(entries: Vec<EmulatorDefinition>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmulatorDefinition> {
        self.entries.iter()
    }

    pub fn get(&self, id: &str) -> Option<&EmulatorDefinition> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut EmulatorDefinition> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    #[cfg(test)]
    pub fn ids(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// First emulator, in catalog order, claiming the extension of `path`.
    pub fn owner_of(&self, path: &Path) -> Option<&EmulatorDefinition> {
        let ext = extension_of(path)?;
        self.entries.iter().find(|e| e.claims_extension(&ext))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for EmulatorCatalog {
    fn default() -> Self {
        default_emulator_catalog()
    }
}

fn paths(list: &[&str]) -> Vec<PathBuf> {
    list.iter().map(PathBuf::from).collect()
}

fn per_platform(tables: [(PlatformKind, &[&str]); 6]) -> BTreeMap<PlatformKind, Vec<PathBuf>> {
    tables
        .into_iter()
        .map(|(kind, list)| (kind, paths(list)))
        .collect()
}

pub fn default_emulator_catalog() -> EmulatorCatalog {
    use PlatformKind::*;

    EmulatorCatalog::new(vec![
        EmulatorDefinition {
            id: "retroarch",
            name: "RetroArch",
            default_paths: per_platform([
                (
                    EmuDeck,
                    &[
                        "~/Emulation/saves/retroarch/saves",
                        "~/.var/app/org.libretro.RetroArch/config/retroarch/saves",
                        "E:/Emulation/saves/retroarch/saves",
                        "D:/Emulation/saves/retroarch/saves",
                        "C:/Emulation/saves/retroarch/saves",
                        "E:/Emulation/saves/RetroArch/saves",
                        "D:/Emulation/saves/RetroArch/saves",
                        "C:/Emulation/saves/RetroArch/saves",
                    ],
                ),
                (RetroPie, &["~/.config/retroarch/saves"]),
                (Batocera, &["/userdata/saves/retroarch"]),
                (Lakka, &["/storage/savefiles"]),
                (
                    EmulationStation,
                    &["~/.config/retroarch/saves", "~/AppData/Roaming/RetroArch/saves"],
                ),
                (
                    Generic,
                    &[
                        "~/.config/retroarch/saves",
                        "~/AppData/Roaming/RetroArch/saves",
                        "E:/Emulation/saves/retroarch",
                        "D:/Emulation/saves/retroarch",
                        "C:/Emulation/saves/retroarch",
                        "E:/Emulation/SaveData/retroarch",
                        "E:/Emulation/retroarch/saves",
                    ],
                ),
            ]),
            save_extensions: vec![".srm", ".sav", ".bsv", ".fs", ".ram", ".dsv"],
            state_extensions: vec![".state", ".save", ".sstate", ".rst", ".ss", ".auto"],
            config_paths: paths(&["~/.config/retroarch/retroarch.cfg"]),
        },
        EmulatorDefinition {
            id: "dolphin",
            name: "Dolphin",
            default_paths: per_platform([
                (
                    EmuDeck,
                    &[
                        "~/Emulation/saves/dolphin/Wii",
                        "~/Emulation/saves/dolphin/GC",
                        "~/.var/app/org.DolphinEmu.dolphin-emu/data/dolphin-emu/GC",
                        "~/.var/app/org.DolphinEmu.dolphin-emu/data/dolphin-emu/Wii",
                        "E:/Emulation/saves/dolphin/Wii",
                        "E:/Emulation/saves/dolphin/GC",
                        "D:/Emulation/saves/dolphin/Wii",
                        "D:/Emulation/saves/dolphin/GC",
                        "C:/Emulation/saves/dolphin/Wii",
                        "C:/Emulation/saves/dolphin/GC",
                    ],
                ),
                (RetroPie, &["~/.config/dolphin-emu/GC", "~/.config/dolphin-emu/Wii"]),
                (Batocera, &["/userdata/saves/dolphin"]),
                (Lakka, &["/storage/dolphin/User/GC", "/storage/dolphin/User/Wii"]),
                (
                    EmulationStation,
                    &[
                        "~/.config/dolphin-emu/GC",
                        "~/.config/dolphin-emu/Wii",
                        "~/Documents/Dolphin Emulator/GC",
                        "~/Documents/Dolphin Emulator/Wii",
                    ],
                ),
                (
                    Generic,
                    &[
                        "~/.config/dolphin-emu/GC",
                        "~/.config/dolphin-emu/Wii",
                        "~/Documents/Dolphin Emulator/GC",
                        "~/Documents/Dolphin Emulator/Wii",
                        "E:/Emulation/saves/dolphin",
                        "E:/Emulation/saves/dolphin/GC",
                        "E:/Emulation/saves/dolphin/Wii",
                        "E:/Emulation/dolphin/User/GC",
                        "E:/Emulation/dolphin/User/Wii",
                    ],
                ),
            ]),
            save_extensions: vec![".gci", ".sav", ".dat", ".raw", ".bin"],
            state_extensions: vec![".s##", ".gcs", ".gci"],
            config_paths: vec![],
        },
        EmulatorDefinition {
            id: "pcsx2",
            name: "PCSX2",
            default_paths: per_platform([
                (
                    EmuDeck,
                    &[
                        "~/Emulation/saves/pcsx2/memcards",
                        "~/.var/app/net.pcsx2.PCSX2/config/PCSX2/memcards",
                        "E:/Emulation/saves/pcsx2/memcards",
                        "D:/Emulation/saves/pcsx2/memcards",
                        "C:/Emulation/saves/pcsx2/memcards",
                        "E:/Emulation/saves/PCSX2/memcards",
                        "D:/Emulation/saves/PCSX2/memcards",
                        "C:/Emulation/saves/PCSX2/memcards",
                        "E:/Emulation/saves/pcsx2/saves",
                        "D:/Emulation/saves/pcsx2/saves",
                        "C:/Emulation/saves/pcsx2/saves",
                    ],
                ),
                (RetroPie, &["~/.config/PCSX2/memcards"]),
                (Batocera, &["/userdata/saves/pcsx2"]),
                (Lakka, &["/storage/pcsx2/memcards"]),
                (
                    EmulationStation,
                    &["~/.config/PCSX2/memcards", "~/Documents/PCSX2/memcards"],
                ),
                (
                    Generic,
                    &[
                        "~/.config/PCSX2/memcards",
                        "~/Documents/PCSX2/memcards",
                        "E:/Emulation/saves/pcsx2",
                        "E:/Emulation/saves/pcsx2/memcards",
                        "E:/Emulation/PCSX2/memcards",
                    ],
                ),
            ]),
            save_extensions: vec![".ps2", ".mcd", ".mcr", ".mc"],
            state_extensions: vec![".p2s", ".ps2state"],
            config_paths: paths(&["~/.config/PCSX2/PCSX2.ini"]),
        },
        EmulatorDefinition {
            id: "rpcs3",
            name: "RPCS3",
            default_paths: per_platform([
                (
                    EmuDeck,
                    &[
                        "~/Emulation/saves/rpcs3/saves",
                        "~/.var/app/net.rpcs3.RPCS3/config/rpcs3/saves",
                        "E:/Emulation/saves/rpcs3/saves",
                        "D:/Emulation/saves/rpcs3/saves",
                        "C:/Emulation/saves/rpcs3/saves",
                        "E:/Emulation/saves/RPCS3/saves",
                        "D:/Emulation/saves/RPCS3/saves",
                        "C:/Emulation/saves/RPCS3/saves",
                        "E:/Emulation/RPCS3/dev_hdd0/home",
                        "D:/Emulation/RPCS3/dev_hdd0/home",
                        "C:/Emulation/RPCS3/dev_hdd0/home",
                    ],
                ),
                (RetroPie, &["~/.config/rpcs3/saves"]),
                (Batocera, &["/userdata/saves/rpcs3"]),
                (Lakka, &["/storage/rpcs3/saves"]),
                (
                    EmulationStation,
                    &["~/.config/rpcs3/saves", "~/Documents/RPCS3/saves"],
                ),
                (
                    Generic,
                    &[
                        "~/.config/rpcs3/saves",
                        "~/Documents/RPCS3/saves",
                        "E:/Emulation/saves/rpcs3",
                        "E:/Emulation/RPCS3/saves",
                        "E:/Emulation/RPCS3/dev_hdd0/home",
                    ],
                ),
            ]),
            save_extensions: vec![".bin", ".dat", ".sav"],
            state_extensions: vec![".dat", ".bin"],
            config_paths: paths(&["~/.config/rpcs3/config.yml"]),
        },
        EmulatorDefinition {
            id: "yuzu",
            name: "Yuzu",
            default_paths: per_platform([
                (
                    EmuDeck,
                    &[
                        "~/Emulation/saves/yuzu/nand/user/save",
                        "~/.var/app/org.yuzu_emu.yuzu/data/yuzu/nand/user/save",
                        "E:/Emulation/saves/yuzu/nand/user/save",
                        "D:/Emulation/saves/yuzu/nand/user/save",
                        "C:/Emulation/saves/yuzu/nand/user/save",
                        "E:/Emulation/saves/Yuzu/nand/user/save",
                        "D:/Emulation/saves/Yuzu/nand/user/save",
                        "C:/Emulation/saves/Yuzu/nand/user/save",
                        "E:/Emulation/yuzu/user/save",
                        "D:/Emulation/yuzu/user/save",
                        "C:/Emulation/yuzu/user/save",
                        "E:/Emulation/saves/yuzu/saves",
                        "D:/Emulation/saves/yuzu/saves",
                        "C:/Emulation/saves/yuzu/saves",
                    ],
                ),
                (RetroPie, &["~/.local/share/yuzu/nand/user/save"]),
                (Batocera, &["/userdata/saves/yuzu"]),
                (Lakka, &["/storage/yuzu/saves"]),
                (
                    EmulationStation,
                    &[
                        "~/.local/share/yuzu/nand/user/save",
                        "~/AppData/Roaming/yuzu/nand/user/save",
                    ],
                ),
                (
                    Generic,
                    &[
                        "~/.local/share/yuzu/nand/user/save",
                        "~/AppData/Roaming/yuzu/nand/user/save",
                        "E:/Emulation/saves/yuzu",
                        "E:/Emulation/yuzu/user/save",
                        "E:/Emulation/yuzu/nand/user/save",
                    ],
                ),
            ]),
            save_extensions: vec![".bin", ".dat", ".sav"],
            state_extensions: vec![".dat"],
            config_paths: paths(&["~/.config/yuzu/config.ini"]),
        },
        EmulatorDefinition {
            id: "cemu",
            name: "Cemu",
            default_paths: per_platform([
                (
                    EmuDeck,
                    &[
                        "~/Emulation/saves/Cemu/saves",
                        "E:/Emulation/saves/Cemu/saves",
                        "D:/Emulation/saves/Cemu/saves",
                        "C:/Emulation/saves/Cemu/saves",
                        "E:/Emulation/saves/cemu/saves",
                        "D:/Emulation/saves/cemu/saves",
                        "C:/Emulation/saves/cemu/saves",
                    ],
                ),
                (RetroPie, &["~/.local/share/Cemu/saves"]),
                (Batocera, &["/userdata/saves/cemu"]),
                (Lakka, &["/storage/cemu/saves"]),
                (
                    EmulationStation,
                    &["~/.local/share/Cemu/saves", "~/Documents/Cemu/saves"],
                ),
                (
                    Generic,
                    &[
                        "~/.local/share/Cemu/saves",
                        "~/Documents/Cemu/saves",
                        "E:/Emulation/saves/Cemu",
                        "E:/Emulation/Cemu/saves",
                    ],
                ),
            ]),
            save_extensions: vec![".bin", ".dat", ".sav", ".srm"],
            state_extensions: vec![".sav", ".save"],
            config_paths: paths(&["~/.config/Cemu/settings.xml"]),
        },
        EmulatorDefinition {
            id: "duckstation",
            name: "DuckStation",
            default_paths: per_platform([
                (
                    EmuDeck,
                    &[
                        "~/Emulation/saves/duckstation/saves",
                        "E:/Emulation/saves/duckstation/saves",
                        "D:/Emulation/saves/duckstation/saves",
                        "C:/Emulation/saves/duckstation/saves",
                    ],
                ),
                (RetroPie, &["~/.local/share/duckstation/saves"]),
                (Batocera, &["/userdata/saves/duckstation"]),
                (Lakka, &["/storage/duckstation/saves"]),
                (
                    EmulationStation,
                    &["~/.local/share/duckstation/saves", "~/Documents/DuckStation/saves"],
                ),
                (
                    Generic,
                    &[
                        "~/.local/share/duckstation/saves",
                        "~/Documents/DuckStation/saves",
                        "E:/Emulation/saves/duckstation",
                        "E:/Emulation/DuckStation/saves",
                    ],
                ),
            ]),
            save_extensions: vec![".mcd", ".mcr", ".mc", ".srm", ".sav"],
            state_extensions: vec![".sav"],
            config_paths: paths(&["~/.config/duckstation/settings.ini"]),
        },
        EmulatorDefinition {
            id: "ppsspp",
            name: "PPSSPP",
            default_paths: per_platform([
                (
                    EmuDeck,
                    &[
                        "~/Emulation/saves/ppsspp/saves",
                        "E:/Emulation/saves/ppsspp/saves",
                        "D:/Emulation/saves/ppsspp/saves",
                        "C:/Emulation/saves/ppsspp/saves",
                        "E:/Emulation/saves/PPSSPP/saves",
                        "D:/Emulation/saves/PPSSPP/saves",
                        "C:/Emulation/saves/PPSSPP/saves",
                    ],
                ),
                (RetroPie, &["~/.config/ppsspp/PSP/SAVEDATA"]),
                (Batocera, &["/userdata/saves/ppsspp"]),
                (Lakka, &["/storage/ppsspp/PSP/SAVEDATA"]),
                (
                    EmulationStation,
                    &["~/.config/ppsspp/PSP/SAVEDATA", "~/Documents/PPSSPP/PSP/SAVEDATA"],
                ),
                (
                    Generic,
                    &[
                        "~/.config/ppsspp/PSP/SAVEDATA",
                        "~/Documents/PPSSPP/PSP/SAVEDATA",
                        "E:/Emulation/saves/ppsspp",
                        "E:/Emulation/PPSSPP/PSP/SAVEDATA",
                    ],
                ),
            ]),
            save_extensions: vec![".bin", ".sav", ".dat"],
            state_extensions: vec![".ppst", ".sav"],
            config_paths: paths(&["~/.config/ppsspp/ppsspp.ini"]),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_lowercase() {
        let catalog = default_emulator_catalog();
        let mut ids = catalog.ids();
        assert!(ids.iter().all(|id| id.to_lowercase() == *id));
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_every_platform_resolves_to_candidates() {
        let catalog = default_emulator_catalog();
        for emulator in catalog.iter() {
            for kind in PlatformKind::ALL {
                assert!(
                    !emulator.candidates(kind).is_empty(),
                    "{} has no candidates for {}",
                    emulator.id,
                    kind
                );
            }
        }
    }

    #[test]
    fn test_platform_without_table_falls_back_to_generic() {
        let catalog = default_emulator_catalog();
        let retroarch = catalog.get("retroarch").unwrap();
        assert_eq!(
            retroarch.candidates(PlatformKind::SteamOs),
            retroarch.candidates(PlatformKind::Generic)
        );
    }

    #[test]
    fn test_extensions_are_lowercase_with_dot() {
        let catalog = default_emulator_catalog();
        for emulator in catalog.iter() {
            for ext in &emulator.save_extensions {
                assert!(ext.starts_with('.'));
                assert_eq!(ext.to_lowercase(), *ext);
            }
        }
    }

    #[test]
    fn test_is_save_file_ignores_case() {
        let catalog = default_emulator_catalog();
        let retroarch = catalog.get("retroarch").unwrap();
        assert!(retroarch.is_save_file(Path::new("/saves/Zelda.SRM")));
        assert!(!retroarch.is_save_file(Path::new("/saves/zelda.txt")));
        assert!(!retroarch.is_save_file(Path::new("/saves/srm")));
    }

    #[test]
    fn test_owner_of_shared_extension_is_first_in_catalog() {
        let catalog = default_emulator_catalog();
        assert_eq!(catalog.owner_of(Path::new("a.sav")).unwrap().id, "retroarch");
        assert_eq!(catalog.owner_of(Path::new("a.bin")).unwrap().id, "dolphin");
        assert_eq!(catalog.owner_of(Path::new("a.mcd")).unwrap().id, "pcsx2");
        assert_eq!(catalog.owner_of(Path::new("a.gci")).unwrap().id, "dolphin");
        assert!(catalog.owner_of(Path::new("a.txt")).is_none());
    }

    #[test]
    fn test_add_candidate_deduplicates() {
        let mut catalog = default_emulator_catalog();
        let cemu = catalog.get_mut("cemu").unwrap();
        let before = cemu.candidates(PlatformKind::Generic).len();

        assert!(cemu.add_candidate(PlatformKind::Generic, Path::new("/x/cemu")));
        assert!(!cemu.add_candidate(PlatformKind::Generic, Path::new("/x/cemu")));
        assert_eq!(cemu.candidates(PlatformKind::Generic).len(), before + 1);
    }

    #[test]
    fn test_add_candidate_to_platform_without_table_keeps_generic_paths() {
        let mut catalog = default_emulator_catalog();
        let yuzu = catalog.get_mut("yuzu").unwrap();
        let generic = yuzu.candidates(PlatformKind::Generic).to_vec();

        yuzu.add_candidate(PlatformKind::Bazzite, Path::new("/x/yuzu"));
        let bazzite = yuzu.candidates(PlatformKind::Bazzite);
        assert_eq!(bazzite.len(), generic.len() + 1);
        assert_eq!(&bazzite[..generic.len()], generic.as_slice());
        assert_eq!(bazzite.last().unwrap(), Path::new("/x/yuzu"));
    }
}
