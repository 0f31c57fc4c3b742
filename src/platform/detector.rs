use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::file_system::FileSystem;
use crate::host::{EMULATION_DRIVES, HostEnvironment, OsFamily, drive_root};
use crate::platform::catalog::*;
use crate::types::PlatformKind;

type Predicate<'a, F> = fn(&PlatformDetector<'a, F>) -> Option<PlatformDescriptor>;

/// Infers which emulation platform the host runs.
///
/// Predicates are tried in a fixed order and the first match wins. The
/// EmuDeck override ([`HostEnvironment::force_emudeck`]) is evaluated at the
/// end of the EmuDeck predicate: genuine EmuDeck evidence is still reported
/// as such, but a forced run never reaches the later predicates.
pub struct PlatformDetector<'a, F: FileSystem> {
    fs: &'a F,
    host: &'a HostEnvironment,
}

impl<'a, F: FileSystem> PlatformDetector<'a, F> {
    pub fn new(fs: &'a F, host: &'a HostEnvironment) -> Self {
        Self { fs, host }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn detect(&self) -> PlatformDescriptor {
        let predicates: [(&str, Predicate<'a, F>); 6] = [
            ("EmuDeck", Self::detect_emudeck),
            ("RetroPie", Self::detect_retropie),
            ("Batocera", Self::detect_batocera),
            ("Lakka", Self::detect_lakka),
            ("EmulationStation", Self::detect_emulationstation),
            ("os-release (SteamOS, Bazzite)", Self::detect_from_os_release),
        ];

        for (label, predicate) in predicates {
            debug!("Checking for {label}");
            if let Some(platform) = predicate(self) {
                info!("Detected platform: {}", platform);
                return platform;
            }
        }

        info!("No specific platform detected, using generic configuration");
        self.generic_platform()
    }

    fn detect_emudeck(&self) -> Option<PlatformDescriptor> {
        let home = self.home();

        for marker in self.emudeck_markers() {
            if !self.exists(&marker) {
                continue;
            }
            debug!("Found potential EmuDeck directory: {}", marker.display());

            if self.host.is_windows() {
                if let Some(emulation) = self.find_emulation_folder() {
                    return Some(self.windows_emudeck(emulation));
                }

                if self.exists(&marker.join(EMUDECK_INSTALLER_SCRIPT)) {
                    debug!("Found EmuDeck installer script in {}", marker.display());
                    let home_emulation = home.join(EMULATION_DIR);
                    let drive_emulation = drive_root("C:").join(EMULATION_DIR);
                    return Some(self.descriptor(
                        PlatformKind::EmuDeck,
                        "EmuDeck (Windows)",
                        marker,
                        self.first_existing([
                            home_emulation.join("roms"),
                            drive_emulation.join("roms"),
                        ]),
                        self.first_existing([
                            home_emulation.join("saves"),
                            drive_emulation.join("saves"),
                        ]),
                    ));
                }
            }

            let rom_dir =
                self.first_existing([marker.join("roms"), home.join(EMULATION_DIR).join("roms")]);
            let save_dir = self.first_existing([
                home.join(EMULATION_DIR).join("saves"),
                home.join(EMULATION_DIR).join("storage"),
            ]);
            return Some(self.descriptor(
                PlatformKind::EmuDeck,
                "EmuDeck",
                marker,
                rom_dir,
                save_dir,
            ));
        }

        if self.host.is_windows() {
            for drive in EMULATION_DRIVES {
                let emulation = drive_root(drive).join(EMULATION_DIR);
                if !self.exists(&emulation) {
                    continue;
                }
                let matches = EMUDECK_STRUCTURE_FOLDERS
                    .iter()
                    .filter(|folder| self.exists(&emulation.join(folder)))
                    .count();
                debug!(
                    "Emulation folder {} has {} of the EmuDeck folders",
                    emulation.display(),
                    matches
                );
                if matches >= EMUDECK_STRUCTURE_MIN_MATCHES {
                    return Some(self.windows_emudeck(emulation));
                }
            }
        }

        if self.host.force_emudeck {
            info!("Forcing EmuDeck platform");
            let base_dir = if self.host.is_windows() {
                self.find_emulation_folder()
                    .unwrap_or_else(|| home.join(EMULATION_DIR))
            } else {
                home.join(EMULATION_DIR)
            };
            let rom_dir = self.verified(base_dir.join("roms"));
            let save_dir = self.verified(base_dir.join("saves"));
            return Some(self.descriptor(
                PlatformKind::EmuDeck,
                "EmuDeck (Forced)",
                base_dir,
                rom_dir,
                save_dir,
            ));
        }

        None
    }

    fn emudeck_markers(&self) -> Vec<PathBuf> {
        let home = self.home();
        let mut markers = EMUDECK_DECK_MARKERS
            .iter()
            .map(PathBuf::from)
            .collect::<Vec<_>>();
        markers.extend(EMUDECK_HOME_MARKERS.iter().map(|m| home.join(m)));
        if self.host.is_windows() {
            markers.extend(
                EMUDECK_MARKER_DRIVES
                    .iter()
                    .map(|drive| drive_root(drive).join("EmuDeck")),
            );
        }
        markers
    }

    fn find_emulation_folder(&self) -> Option<PathBuf> {
        self.first_existing(
            EMULATION_DRIVES
                .iter()
                .map(|drive| drive_root(drive).join(EMULATION_DIR)),
        )
    }

    fn windows_emudeck(&self, emulation: PathBuf) -> PlatformDescriptor {
        info!(
            "Detected EmuDeck on Windows with Emulation folder at {}",
            emulation.display()
        );
        let rom_dir = self.verified(emulation.join("roms"));
        let save_dir = self.verified(emulation.join("saves"));
        self.descriptor(
            PlatformKind::EmuDeck,
            "EmuDeck (Windows)",
            emulation,
            rom_dir,
            save_dir,
        )
    }

    fn detect_retropie(&self) -> Option<PlatformDescriptor> {
        let marker = self.first_existing(RETROPIE_MARKERS.iter().map(PathBuf::from))?;
        let rom_dir = self.verified(marker.join("roms"));
        let save_dir = self.verified(self.home().join(RETROARCH_LINUX_SAVES));
        Some(self.descriptor(PlatformKind::RetroPie, "RetroPie", marker, rom_dir, save_dir))
    }

    fn detect_batocera(&self) -> Option<PlatformDescriptor> {
        let marker = self.first_existing(BATOCERA_MARKERS.iter().map(PathBuf::from))?;
        let userdata = Path::new(BATOCERA_USERDATA);
        let rom_dir = self.verified(userdata.join("roms"));
        let save_dir = self.verified(userdata.join("saves"));
        Some(self.descriptor(PlatformKind::Batocera, "Batocera", marker, rom_dir, save_dir))
    }

    fn detect_lakka(&self) -> Option<PlatformDescriptor> {
        if !self.exists(Path::new(LAKKA_MARKER)) {
            return None;
        }
        let storage = PathBuf::from(LAKKA_STORAGE);
        let rom_dir = self.verified(storage.join("roms"));
        let save_dir = self.verified(storage.join("savefiles"));
        Some(self.descriptor(PlatformKind::Lakka, "Lakka", storage, rom_dir, save_dir))
    }

    fn detect_emulationstation(&self) -> Option<PlatformDescriptor> {
        let home = self.home();
        let mut markers = vec![home.join(EMULATIONSTATION_HOME_MARKER)];
        markers.extend(EMULATIONSTATION_MARKERS.iter().map(PathBuf::from));
        let marker = self.first_existing(markers)?;

        let (rom_dir, save_dir) = if self.host.is_windows() {
            (
                PathBuf::from(EMULATIONSTATION_WINDOWS_ROMS),
                home.join(RETROARCH_WINDOWS_SAVES),
            )
        } else {
            (home.join("ROMs"), home.join(RETROARCH_LINUX_SAVES))
        };
        let rom_dir = self.verified(rom_dir);
        let save_dir = self.verified(save_dir);
        Some(self.descriptor(
            PlatformKind::EmulationStation,
            "EmulationStation",
            marker,
            rom_dir,
            save_dir,
        ))
    }

    /// SteamOS and Bazzite identify themselves only through `os-release`.
    fn detect_from_os_release(&self) -> Option<PlatformDescriptor> {
        if self.host.os != OsFamily::Linux {
            return None;
        }
        let release = match self.fs.read_to_string(Path::new(OS_RELEASE)) {
            Ok(release) => release,
            Err(e) => {
                debug!("Unable to read {}: {}", OS_RELEASE, e);
                return None;
            }
        };

        let (kind, name) = if release.contains(BAZZITE_RELEASE_MARKER) {
            (PlatformKind::Bazzite, "Bazzite")
        } else if release.contains(STEAMOS_RELEASE_MARKER) {
            (PlatformKind::SteamOs, "SteamOS")
        } else {
            return None;
        };

        let home = self.home();
        let rom_dir = self.verified(home.join(EMULATION_DIR).join("roms"));
        let save_dir = self.verified(home.join(EMULATION_DIR).join("saves"));
        Some(self.descriptor(kind, name, home, rom_dir, save_dir))
    }

    fn generic_platform(&self) -> PlatformDescriptor {
        let home = self.home();
        let mut candidates = vec![];
        if self.host.is_windows() {
            for drive in EMULATION_DRIVES {
                candidates.extend(GENERIC_BASE_NAMES.iter().map(|n| drive_root(drive).join(n)));
            }
        }
        candidates.extend(GENERIC_BASE_NAMES.iter().map(|n| home.join(n)));

        match self.first_existing(candidates) {
            Some(base_dir) => {
                debug!("Found emulation directory: {}", base_dir.display());
                let rom_dir = self.first_existing(GENERIC_ROM_DIRS.iter().map(|d| base_dir.join(d)));
                let save_dir =
                    self.first_existing(GENERIC_SAVE_DIRS.iter().map(|d| base_dir.join(d)));
                self.descriptor(
                    PlatformKind::Generic,
                    "Generic Emulation Setup",
                    base_dir,
                    rom_dir,
                    save_dir,
                )
            }
            None => {
                let base_dir = if self.host.is_windows() {
                    home.join(EMULATION_DIR)
                } else {
                    home.join(GENERIC_UNIX_FALLBACK)
                };
                debug!(
                    "No existing emulation directory found, defaulting to {}",
                    base_dir.display()
                );
                self.descriptor(
                    PlatformKind::Generic,
                    "Generic Emulation Setup",
                    base_dir,
                    None,
                    None,
                )
            }
        }
    }

    fn descriptor(
        &self,
        kind: PlatformKind,
        name: &str,
        base_dir: PathBuf,
        rom_dir: Option<PathBuf>,
        save_dir: Option<PathBuf>,
    ) -> PlatformDescriptor {
        PlatformDescriptor {
            kind,
            name: name.to_string(),
            base_dir,
            rom_dir,
            save_dir,
        }
    }

    fn home(&self) -> PathBuf {
        self.host.home_or_empty()
    }

    /// Probe errors count as "does not exist".
    fn exists(&self, path: &Path) -> bool {
        match self.fs.exists(path) {
            Ok(exists) => exists,
            Err(e) => {
                debug!("Error checking path {}: {}", path.display(), e);
                false
            }
        }
    }

    fn verified(&self, path: PathBuf) -> Option<PathBuf> {
        self.exists(&path).then_some(path)
    }

    fn first_existing<I: IntoIterator<Item = PathBuf>>(&self, candidates: I) -> Option<PathBuf> {
        candidates.into_iter().find(|p| self.exists(p))
    }
}
