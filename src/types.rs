use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TypesError {
    #[error("Platform '{0}' is not known")]
    UnknownPlatform(String),
}

/// Emulation environment a host can be running.
///
/// Variant order is the order of the detection cascade, most specific first.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlatformKind {
    EmuDeck,
    RetroPie,
    Batocera,
    Lakka,
    EmulationStation,
    SteamOs,
    Bazzite,
    #[default]
    Generic,
}

impl PlatformKind {
    pub const ALL: [PlatformKind; 8] = [
        PlatformKind::EmuDeck,
        PlatformKind::RetroPie,
        PlatformKind::Batocera,
        PlatformKind::Lakka,
        PlatformKind::EmulationStation,
        PlatformKind::SteamOs,
        PlatformKind::Bazzite,
        PlatformKind::Generic,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            PlatformKind::EmuDeck => "emudeck",
            PlatformKind::RetroPie => "retropie",
            PlatformKind::Batocera => "batocera",
            PlatformKind::Lakka => "lakka",
            PlatformKind::EmulationStation => "emulationstation",
            PlatformKind::SteamOs => "steamos",
            PlatformKind::Bazzite => "bazzite",
            PlatformKind::Generic => "generic",
        }
    }
}

impl Display for PlatformKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl TryFrom<&str> for PlatformKind {
    type Error = TypesError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();
        PlatformKind::ALL
            .into_iter()
            .find(|kind| kind.id() == lower)
            .ok_or_else(|| TypesError::UnknownPlatform(value.to_string()))
    }
}

impl TryFrom<String> for PlatformKind {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl FromStr for PlatformKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_kind_round_trips_through_its_id() {
        for kind in PlatformKind::ALL {
            assert_eq!(PlatformKind::try_from(kind.id()), Ok(kind));
        }
    }

    #[test]
    fn test_platform_kind_is_case_insensitive() {
        assert_eq!(PlatformKind::try_from("EmuDeck"), Ok(PlatformKind::EmuDeck));
        assert_eq!("RETROPIE".parse::<PlatformKind>(), Ok(PlatformKind::RetroPie));
    }

    #[test]
    fn test_unknown_platform() {
        assert_eq!(
            PlatformKind::try_from("dreamcast"),
            Err(TypesError::UnknownPlatform("dreamcast".into()))
        );
    }
}
