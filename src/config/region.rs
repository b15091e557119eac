//! Bluemix region definitions.
//!
//! This module provides the [`BluemixRegion`] enum for selecting the
//! geographic domain the backend application is hosted in.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// The region where the Bluemix application is hosted.
///
/// Each region maps to a domain suffix that routes resolve against.
///
/// # Example
///
/// ```rust
/// use bms_core::BluemixRegion;
///
/// assert_eq!(BluemixRegion::UsSouth.suffix(), "ng.bluemix.net");
///
/// // Parse from the region name or its suffix
/// let region: BluemixRegion = "UK".parse().unwrap();
/// assert_eq!(region, BluemixRegion::Uk);
/// let region: BluemixRegion = "au-syd.bluemix.net".parse().unwrap();
/// assert_eq!(region, BluemixRegion::Sydney);
///
/// // Display as the suffix
/// assert_eq!(format!("{}", BluemixRegion::Uk), "eu-gb.bluemix.net");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BluemixRegion {
    /// US South (`ng.bluemix.net`).
    UsSouth,
    /// United Kingdom (`eu-gb.bluemix.net`).
    Uk,
    /// Sydney (`au-syd.bluemix.net`).
    Sydney,
}

impl BluemixRegion {
    /// Returns the domain suffix for this region.
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::UsSouth => "ng.bluemix.net",
            Self::Uk => "eu-gb.bluemix.net",
            Self::Sydney => "au-syd.bluemix.net",
        }
    }

    /// Returns the region's identifier, e.g. `US_SOUTH`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UsSouth => "US_SOUTH",
            Self::Uk => "UK",
            Self::Sydney => "SYDNEY",
        }
    }

    /// Returns every known region.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::UsSouth, Self::Uk, Self::Sydney]
    }
}

impl fmt::Display for BluemixRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for BluemixRegion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::all()
            .into_iter()
            .find(|region| {
                region.name().eq_ignore_ascii_case(trimmed)
                    || region.suffix().eq_ignore_ascii_case(trimmed.trim_start_matches('.'))
            })
            .ok_or_else(|| ConfigError::InvalidRegion {
                region: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_suffixes() {
        assert_eq!(BluemixRegion::UsSouth.suffix(), "ng.bluemix.net");
        assert_eq!(BluemixRegion::Uk.suffix(), "eu-gb.bluemix.net");
        assert_eq!(BluemixRegion::Sydney.suffix(), "au-syd.bluemix.net");
    }

    #[test]
    fn test_region_parses_names_case_insensitively() {
        assert_eq!("us_south".parse::<BluemixRegion>().unwrap(), BluemixRegion::UsSouth);
        assert_eq!("Sydney".parse::<BluemixRegion>().unwrap(), BluemixRegion::Sydney);
    }

    #[test]
    fn test_region_parses_suffixes() {
        for region in BluemixRegion::all() {
            assert_eq!(region.suffix().parse::<BluemixRegion>().unwrap(), region);
        }
        assert_eq!(
            ".eu-gb.bluemix.net".parse::<BluemixRegion>().unwrap(),
            BluemixRegion::Uk
        );
    }

    #[test]
    fn test_region_rejects_unknown() {
        let result = "mars.bluemix.net".parse::<BluemixRegion>();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRegion { region }) if region == "mars.bluemix.net"
        ));
    }

    #[test]
    fn test_region_display_is_suffix() {
        assert_eq!(BluemixRegion::Sydney.to_string(), "au-syd.bluemix.net");
    }
}
