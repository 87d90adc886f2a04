//! Deployment stages and the prerelease label each one carries
//!
//! Only `dev` mutates anything. The other stages still map to a label so the
//! displayed version reflects where the artifact is heading.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Pre-release identifier attached to a rendered version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreReleaseType {
    /// Alpha pre-release
    Alpha,
    /// Beta pre-release
    Beta,
    /// Release candidate
    ReleaseCandidate,
}

impl fmt::Display for PreReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreReleaseType::Alpha => write!(f, "alpha"),
            PreReleaseType::Beta => write!(f, "beta"),
            PreReleaseType::ReleaseCandidate => write!(f, "rc"),
        }
    }
}

/// Deployment stage passed on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Dev,
    Qa,
    Staging,
    /// Any other literal; kept verbatim for display
    Other(String),
}

impl Stage {
    /// Parse a stage name. Never fails: unknown names become `Stage::Other`.
    pub fn parse(s: &str) -> Self {
        match s.parse() {
            Ok(stage) => stage,
            Err(never) => match never {},
        }
    }

    /// Whether this stage bumps, writes, tags and pushes
    pub fn is_dev(&self) -> bool {
        matches!(self, Stage::Dev)
    }

    /// Prerelease label keyed purely by stage
    ///
    /// dev → alpha, qa → beta, staging → rc, anything else → none
    pub fn prerelease(&self) -> Option<PreReleaseType> {
        match self {
            Stage::Dev => Some(PreReleaseType::Alpha),
            Stage::Qa => Some(PreReleaseType::Beta),
            Stage::Staging => Some(PreReleaseType::ReleaseCandidate),
            Stage::Other(_) => None,
        }
    }
}

impl FromStr for Stage {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "dev" => Stage::Dev,
            "qa" => Stage::Qa,
            "staging" => Stage::Staging,
            other => Stage::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Dev => write!(f, "dev"),
            Stage::Qa => write!(f, "qa"),
            Stage::Staging => write!(f, "staging"),
            Stage::Other(name) => write!(f, "{}", name),
        }
    }
}
