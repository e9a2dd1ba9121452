//! Mix types offered by the RandomPlay plugin

use std::fmt;
use std::str::FromStr;

use lms_remote_lms_client::ServerVersion;
use serde::{Deserialize, Serialize};

use crate::error::MixError;

/// First server version with `works` mixes
pub const WORKS_MIN_VERSION: ServerVersion = ServerVersion::new(9, 0, 0);

/// What the random mix picks from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixType {
    #[default]
    Tracks,
    Albums,
    Contributors,
    Year,
    Works,
}

impl MixType {
    /// Keyword used by `randomplay <mix>`
    pub fn key(&self) -> &'static str {
        match self {
            Self::Tracks => "tracks",
            Self::Albums => "albums",
            Self::Contributors => "contributors",
            Self::Year => "year",
            Self::Works => "works",
        }
    }

    /// Display label; albums read as releases when the server groups by release type
    pub fn label(&self, release_types: bool) -> &'static str {
        match self {
            Self::Tracks => "Tracks",
            Self::Albums if release_types => "Releases",
            Self::Albums => "Albums",
            Self::Contributors => "Artists",
            Self::Year => "Years",
            Self::Works => "Works",
        }
    }
}

impl fmt::Display for MixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MixType {
    type Err = MixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "tracks" => Ok(Self::Tracks),
            "albums" => Ok(Self::Albums),
            "contributors" => Ok(Self::Contributors),
            "year" => Ok(Self::Year),
            "works" => Ok(Self::Works),
            other => Err(MixError::InvalidInput(format!("unknown mix type '{}'", other))),
        }
    }
}

/// One selectable mix type with its label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MixOption {
    pub mix: MixType,
    pub label: &'static str,
}

/// Mix types the server supports, in display order
pub fn available_mixes(version: ServerVersion, release_types: bool) -> Vec<MixOption> {
    let mut mixes = vec![MixType::Tracks, MixType::Albums, MixType::Contributors, MixType::Year];
    if version >= WORKS_MIN_VERSION {
        mixes.push(MixType::Works);
    }
    mixes
        .into_iter()
        .map(|mix| MixOption {
            mix,
            label: mix.label(release_types),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ServerVersion::new(8, 5, 2), 4)]
    #[case(ServerVersion::new(9, 0, 0), 5)]
    #[case(ServerVersion::new(9, 1, 0), 5)]
    fn test_works_needs_nine(#[case] version: ServerVersion, #[case] expected: usize) {
        assert_eq!(available_mixes(version, false).len(), expected);
    }

    #[test]
    fn test_album_label_follows_release_types() {
        let mixes = available_mixes(ServerVersion::new(9, 0, 0), true);
        assert_eq!(mixes[1].label, "Releases");
        assert_eq!(MixType::Albums.label(false), "Albums");
    }

    #[test]
    fn test_parse_mix_type() {
        assert_eq!("year".parse::<MixType>().unwrap(), MixType::Year);
        assert!("random".parse::<MixType>().is_err());
    }
}
