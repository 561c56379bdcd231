// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A totally ordered version identity: `MAJOR.MINOR.PATCH`.

use std::fmt::{self, Display};
use std::str::FromStr;

use thiserror::Error;

/// A semantic-style version: `major.minor.patch`, ordered lexicographically on the triple.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
}

impl Version {
    /// Create a version with explicit major, minor and patch values.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Version `0.0.0`, the lowest possible version.
    pub fn zero() -> Self {
        Self::new(0, 0, 0)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A version string failed to parse.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum VersionParseError {
    /// The string was not exactly three dot-separated parts.
    #[error("version {0:?} is not of the form MAJOR.MINOR.PATCH")]
    NotThreeParts(String),
    /// One of the three parts was not a non-negative integer.
    #[error("version part {part:?} in {version:?} is not a non-negative integer")]
    InvalidNumber {
        /// The full version string being parsed.
        version: String,
        /// The offending part.
        part: String,
    },
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(VersionParseError::NotThreeParts(s.to_string()));
        };
        let parse_part = |part: &str| -> Result<u32, VersionParseError> {
            part.parse::<u32>()
                .map_err(|_| VersionParseError::InvalidNumber {
                    version: s.to_string(),
                    part: part.to_string(),
                })
        };
        Ok(Version {
            major: parse_part(major)?,
            minor: parse_part(minor)?,
            patch: parse_part(patch)?,
        })
    }
}

impl TryFrom<String> for Version {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.to_string()
    }
}

impl From<(u32, u32, u32)> for Version {
    fn from(tuple: (u32, u32, u32)) -> Self {
        let (major, minor, patch) = tuple;
        Self::new(major, minor, patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_versions() {
        assert_eq!("1.0.0".parse::<Version>().unwrap(), Version::new(1, 0, 0));
        assert_eq!("0.0.0".parse::<Version>().unwrap(), Version::zero());
        assert_eq!(
            "10.20.30".parse::<Version>().unwrap(),
            Version::new(10, 20, 30)
        );
    }

    #[test]
    fn rejects_wrong_part_count() {
        assert!(matches!(
            "1.0".parse::<Version>(),
            Err(VersionParseError::NotThreeParts(_))
        ));
        assert!(matches!(
            "1.0.0.0".parse::<Version>(),
            Err(VersionParseError::NotThreeParts(_))
        ));
    }

    #[test]
    fn rejects_non_numeric_or_negative_parts() {
        assert!(matches!(
            "1.x.0".parse::<Version>(),
            Err(VersionParseError::InvalidNumber { .. })
        ));
        assert!(matches!(
            "-1.0.0".parse::<Version>(),
            Err(VersionParseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn orders_lexicographically() {
        assert!(Version::new(1, 0, 0) < Version::new(1, 0, 1));
        assert!(Version::new(1, 0, 0) < Version::new(1, 1, 0));
        assert!(Version::new(1, 9, 9) < Version::new(2, 0, 0));
    }

    #[test]
    fn round_trips_through_display() {
        let v = Version::new(3, 4, 5);
        assert_eq!(v.to_string().parse::<Version>().unwrap(), v);
    }
}
