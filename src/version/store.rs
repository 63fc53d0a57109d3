//! Version tag and persistent version store
//!
//! The version is an ordered (major, minor) pair rendered as
//! "major.minor". Every publish attempt bumps the minor component once;
//! the major component is never auto-incremented.

use crate::error::{IoResultExt, PatchForgeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Two-part version identifier, ordered by (major, minor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTag {
    /// Major version component
    pub major: u32,
    /// Minor version component
    pub minor: u32,
}

impl VersionTag {
    /// Create a new version tag
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The initial version used when no prior state exists
    pub fn initial() -> Self {
        Self::new(1, 0)
    }

    /// Return the next version: minor + 1, major untouched
    pub fn increment(self) -> Self {
        Self::new(self.major, self.minor + 1)
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for VersionTag {
    type Err = PatchForgeError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || PatchForgeError::VersionFormat(s.to_string());

        let (major, minor) = s.split_once('.').ok_or_else(malformed)?;
        let major: u32 = major.parse().map_err(|_| malformed())?;
        let minor: u32 = minor.parse().map_err(|_| malformed())?;

        Ok(Self::new(major, minor))
    }
}

/// On-disk shape of the version file: {"version": "1.4"}
#[derive(Debug, Serialize, Deserialize)]
struct VersionFile {
    version: String,
}

/// Persistent store for the publish version
///
/// Single-writer, single-reader per run; concurrent runs against the
/// same version file are not supported.
#[derive(Debug, Clone)]
pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    /// Create a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted version, defaulting to 1.0 when no file exists
    ///
    /// Absence is never an error; a present but malformed file fails with
    /// `VersionFormat` and requires manual correction.
    pub fn load(&self) -> Result<VersionTag> {
        if !self.path.exists() {
            return Ok(VersionTag::initial());
        }

        let content = std::fs::read_to_string(&self.path).with_path(&self.path)?;
        let file: VersionFile = serde_json::from_str(&content)
            .map_err(|_| PatchForgeError::VersionFormat(content.trim().to_string()))?;

        file.version.parse()
    }

    /// Persist the version, atomically overwriting prior state
    pub fn save(&self, tag: VersionTag) -> Result<()> {
        let file = VersionFile {
            version: tag.to_string(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| PatchForgeError::ManifestError(e.to_string()))?;

        // Write to a sibling temp file and rename over the target so a
        // crash mid-write never leaves a truncated version file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_path(&tmp)?;
        std::fs::rename(&tmp, &self.path).with_path(&self.path)?;

        tracing::debug!(version = %tag, path = %self.path.display(), "version saved");
        Ok(())
    }
}
