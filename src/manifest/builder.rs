//! Directory walk, hashing and classification
//!
//! Builds a complete manifest for a publish root: every regular file is
//! hashed and sized, then classified as the patcher singleton, an
//! executable, or plain content. The walk is sorted by file name so the
//! result is deterministic across file systems.

use crate::error::{PatchForgeError, Result};
use crate::hash::hash_file;
use crate::manifest::{FileRecord, Manifest, PatcherRecord};
use crate::version::VersionTag;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Extension marking executable artifacts (case-insensitive)
pub const EXECUTABLE_EXTENSION: &str = "exe";

/// Reserved top-level subdirectory holding the patcher executable
pub const PATCHER_DIR: &str = "patcher";

/// Builds manifests for a publish root directory
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    root: PathBuf,
}

impl ManifestBuilder {
    /// Create a builder for the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The publish root this builder walks
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build a manifest for the given version
    ///
    /// Returns the manifest plus the count of all regular files visited,
    /// used downstream as the progress denominator. Any unreadable file
    /// aborts the build; partial manifests are never returned.
    pub fn build(&self, version: VersionTag) -> Result<(Manifest, usize)> {
        let mut manifest = Manifest::new(version);
        let mut total_files = 0usize;

        let patcher_path = self.find_patcher_candidate()?;
        if let Some(path) = &patcher_path {
            let result = hash_file(path)?;
            manifest.patcher = Some(PatcherRecord {
                name: file_name(path),
                hash: result.hash,
                size: result.size,
                path: path.to_string_lossy().into_owned(),
            });
        }

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.root).to_path_buf();
                match e.into_io_error() {
                    Some(io) => PatchForgeError::io(path, io),
                    None => PatchForgeError::io(
                        path,
                        std::io::Error::new(std::io::ErrorKind::Other, "walk cycle"),
                    ),
                }
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            total_files += 1;

            let path = entry.path();
            // The selected patcher is recorded only as the singleton
            if patcher_path.as_deref() == Some(path) {
                continue;
            }

            let name = file_name(path);
            let result = hash_file(path)?;
            let record = FileRecord {
                path: self.relative_path(path),
                hash: result.hash,
                size: result.size,
            };

            if is_executable(path) {
                manifest.executables.insert(name, record);
            } else {
                manifest.files.insert(name, record);
            }
        }

        debug!(
            version = %version,
            files = manifest.files.len(),
            executables = manifest.executables.len(),
            patcher = manifest.patcher.is_some(),
            total = total_files,
            "manifest built"
        );

        Ok((manifest, total_files))
    }

    /// Locate the patcher candidate: executables directly inside the
    /// reserved `patcher/` subdirectory, lexicographically-smallest file
    /// name first so the pick is deterministic.
    fn find_patcher_candidate(&self) -> Result<Option<PathBuf>> {
        let patcher_dir = self.root.join(PATCHER_DIR);
        if !patcher_dir.is_dir() {
            return Ok(None);
        }

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(&patcher_dir)
            .map_err(|e| PatchForgeError::io(&patcher_dir, e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_executable(path))
            .collect();

        candidates.sort();
        Ok(candidates.into_iter().next())
    }

    /// Path relative to the root, '/'-separated regardless of platform
    fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_executable(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(EXECUTABLE_EXTENSION))
        .unwrap_or(false)
}
