use crate::domain::PreReleaseType;
use crate::error::{CiBumpError, Result};
use semver::{BuildMetadata, Prerelease};
use std::fmt;

/// Semantic version core (major.minor.patch)
///
/// Prerelease and build metadata are not part of the stored value: they are
/// attached at render time from the stage and the CI pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a manifest version string using the strict SemVer 2.0 grammar.
    ///
    /// Prerelease and build metadata left over from a previous run
    /// (e.g. "1.2.3+456") are accepted and dropped.
    pub fn parse(raw: &str) -> Result<Self> {
        let parsed = semver::Version::parse(raw).map_err(|e| {
            CiBumpError::semver(format!("'{}' is not valid according to SemVer: {}", raw, e))
        })?;

        Ok(Version {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
        })
    }

    /// Bump version according to bump type
    pub fn bump(&self, bump_type: &VersionBump) -> Result<Self> {
        let overflow = || CiBumpError::bump(format!("cannot apply {} bump to {}", bump_type, self));

        let bumped = match bump_type {
            VersionBump::Major => Version {
                major: self.major.checked_add(1).ok_or_else(overflow)?,
                minor: 0,
                patch: 0,
            },
            VersionBump::Minor => Version {
                major: self.major,
                minor: self.minor.checked_add(1).ok_or_else(overflow)?,
                patch: 0,
            },
            VersionBump::Patch => Version {
                major: self.major,
                minor: self.minor,
                patch: self.patch.checked_add(1).ok_or_else(overflow)?,
            },
        };
        Ok(bumped)
    }

    /// Render as `MAJOR.MINOR.PATCH[-prerelease][+build]`.
    ///
    /// An empty build string means no build metadata.
    pub fn render(&self, prerelease: Option<&PreReleaseType>, build: Option<&str>) -> Result<String> {
        let pre = match prerelease {
            Some(label) => Prerelease::new(&label.to_string()).map_err(|e| {
                CiBumpError::semver(format!("invalid prerelease '{}': {}", label, e))
            })?,
            None => Prerelease::EMPTY,
        };

        let build = match build.map(str::trim).filter(|b| !b.is_empty()) {
            Some(b) => BuildMetadata::new(b).map_err(|e| {
                CiBumpError::semver(format!("invalid build metadata '{}': {}", b, e))
            })?,
            None => BuildMetadata::EMPTY,
        };

        let full = semver::Version {
            major: self.major,
            minor: self.minor,
            patch: self.patch,
            pre,
            build,
        };
        Ok(full.to_string())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Version bump type decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionBump::Major => write!(f, "major"),
            VersionBump::Minor => write!(f, "minor"),
            VersionBump::Patch => write!(f, "patch"),
        }
    }
}
