use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use thiserror::Error;

/// Error type for version and version-range parsing.
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("invalid version '{text}': {source}")]
    InvalidVersion {
        text: String,
        #[source]
        source: semver::Error,
    },
    #[error("invalid version range '{text}': {source}")]
    InvalidRange {
        text: String,
        #[source]
        source: semver::Error,
    },
}

/// Parses a version string like "1.2.3" into a `semver::Version`.
pub fn parse_version(text: &str) -> Result<Version, VersionError> {
    Version::parse(text).map_err(|e| VersionError::InvalidVersion {
        text: text.to_string(),
        source: e,
    })
}

/// Represents a version requirement range using semver constraints.
#[derive(Debug, Clone)]
pub struct VersionRange {
    /// The original constraint string (e.g., "^1.2.3", ">=2.0")
    constraint: String,
    /// The parsed semver requirement
    req: VersionReq,
}

impl VersionRange {
    /// Creates a new version range from a constraint string.
    pub fn from_constraint(constraint: &str) -> Result<Self, VersionError> {
        let req = VersionReq::parse(constraint).map_err(|e| VersionError::InvalidRange {
            text: constraint.to_string(),
            source: e,
        })?;
        Ok(Self {
            constraint: constraint.to_string(),
            req,
        })
    }

    /// The range that accepts every version ("*").
    pub fn any() -> Self {
        Self {
            constraint: "*".to_string(),
            req: VersionReq::STAR,
        }
    }

    /// Checks if a specific version satisfies this range.
    pub fn includes(&self, version: &Version) -> bool {
        self.req.matches(version)
    }

    /// Returns a reference to the underlying `semver::VersionReq`.
    pub fn semver_req(&self) -> &VersionReq {
        &self.req
    }

    /// Returns the original constraint string.
    pub fn constraint_string(&self) -> &str {
        &self.constraint
    }
}

/// Implement Display to show the original constraint string.
impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraint)
    }
}

/// Allow parsing directly from a string slice.
impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::from_constraint(s)
    }
}

/// Returns the greatest version among `versions` that satisfies `range`,
/// or `None` if no element does. Versions are totally ordered and distinct
/// within one set, so no further tie-break is needed.
pub fn max_satisfying<'a, I>(versions: I, range: &VersionRange) -> Option<&'a Version>
where
    I: IntoIterator<Item = &'a Version>,
{
    versions.into_iter().filter(|v| range.includes(v)).max()
}
