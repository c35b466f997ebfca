//! Packed three-part version numbers
//!
//! A dotted `major.minor.patch` string is packed into a single integer with
//! 10 bits per part: `major | minor << 10 | patch << 20`. The packed form is
//! what gets recorded in an installed marker; ordering is always decided on
//! the unpacked parts so that `1.0.0 > 0.9.9` holds regardless of bit layout.

use crate::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Exclusive upper bound for every version part
pub const PART_LIMIT: u32 = 1024;

const PART_BITS: u32 = 10;
const PART_MASK: u32 = PART_LIMIT - 1;

/// A validated three-part version with its packed encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    parts: [u32; 3],
}

impl Version {
    /// Create a version from its parts, rejecting parts outside `[0, 1024)`
    pub fn new(major: u32, minor: u32, patch: u32) -> Result<Self> {
        for part in [major, minor, patch] {
            if part >= PART_LIMIT {
                return Err(Error::InvalidVersion {
                    version: format!("{}.{}.{}", major, minor, patch),
                    reason: format!("{} is too large", part),
                });
            }
        }
        Ok(Self {
            parts: [major, minor, patch],
        })
    }

    /// Parse a dotted version string
    pub fn parse(version: &str) -> Result<Self> {
        let pieces: Vec<&str> = version.split('.').collect();
        if pieces.len() != 3 {
            return Err(Error::InvalidVersion {
                version: version.to_string(),
                reason: format!("expected 3 parts, got {}", pieces.len()),
            });
        }

        let mut parts = [0u32; 3];
        for (slot, piece) in parts.iter_mut().zip(&pieces) {
            let value: u32 = piece.trim().parse().map_err(|_| Error::InvalidVersion {
                version: version.to_string(),
                reason: format!("'{}' is not a number", piece),
            })?;
            if value >= PART_LIMIT {
                return Err(Error::InvalidVersion {
                    version: version.to_string(),
                    reason: format!("{} is too large", piece),
                });
            }
            *slot = value;
        }

        Ok(Self { parts })
    }

    /// Decode a packed integer back into its parts
    pub fn from_packed(packed: u32) -> Self {
        Self {
            parts: [
                packed & PART_MASK,
                (packed >> PART_BITS) & PART_MASK,
                (packed >> (PART_BITS * 2)) & PART_MASK,
            ],
        }
    }

    /// The packed integer encoding
    pub fn packed(&self) -> u32 {
        self.parts
            .iter()
            .enumerate()
            .fold(0, |acc, (i, part)| acc | (part << (PART_BITS * i as u32)))
    }

    pub fn major(&self) -> u32 {
        self.parts[0]
    }

    pub fn minor(&self) -> u32 {
        self.parts[1]
    }

    pub fn patch(&self) -> u32 {
        self.parts[2]
    }

    /// Report both representations
    pub fn info(&self) -> VersionInfo {
        VersionInfo {
            semantic_version: self.to_string(),
            packed_integer: self.packed(),
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.parts[0], self.parts[1], self.parts[2])
    }
}

/// Both forms of a version, as returned by `Installer::version`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub semantic_version: String,
    pub packed_integer: u32,
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
