//! Change-set computation against a published baseline
//!
//! Compares a freshly built manifest against the latest published files
//! map. The content hash is the sole equality criterion; size is
//! informational only. The serialized manifest itself is always part of
//! the change set, since it is the pointer downstream patchers follow.

use crate::manifest::{FileRecord, Manifest, PublishedManifest};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ordered, path-deduplicated set of local paths requiring upload
///
/// The serialized manifest is always the final entry, regardless of the
/// diff outcome.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    entries: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl ChangeSet {
    fn push(&mut self, path: PathBuf) {
        if self.seen.insert(path.clone()) {
            self.entries.push(path);
        }
    }

    /// Paths in admission order
    pub fn paths(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the set holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in admission order
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries.iter()
    }

    /// Check membership by path
    pub fn contains(&self, path: &Path) -> bool {
        self.seen.contains(path)
    }
}

/// Computes change sets between manifests
#[derive(Debug, Clone)]
pub struct ManifestDiffer {
    root: PathBuf,
}

impl ManifestDiffer {
    /// Create a differ resolving record paths against the given root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Compute the change set between the published baseline and a fresh
    /// manifest.
    ///
    /// The baseline files map is the numerically-maximal historical entry
    /// of `old`; an absent or empty `old` means every record is changed.
    /// `manifest_path` is appended unconditionally as the final entry.
    pub fn diff(
        &self,
        old: Option<&PublishedManifest>,
        new: &Manifest,
        manifest_path: &Path,
    ) -> ChangeSet {
        let mut changes = ChangeSet::default();

        let empty = BTreeMap::new();
        let baseline_files = old.and_then(PublishedManifest::latest_files).unwrap_or(&empty);
        let baseline_exe = old.map(|o| &o.executables).unwrap_or(&empty);

        self.diff_category(&new.files, baseline_files, manifest_path, &mut changes);
        self.diff_category(&new.executables, baseline_exe, manifest_path, &mut changes);

        if let Some(patcher) = &new.patcher {
            let unchanged = old
                .and_then(|o| o.patcher.as_ref())
                .map(|old_patcher| old_patcher.hash == patcher.hash)
                .unwrap_or(false);
            if !unchanged {
                changes.push(PathBuf::from(&patcher.path));
            }
        }

        changes.push(manifest_path.to_path_buf());

        debug!(
            changed = changes.len() - 1,
            total = new.record_count(),
            "change set computed"
        );

        changes
    }

    fn diff_category(
        &self,
        new: &BTreeMap<String, FileRecord>,
        baseline: &BTreeMap<String, FileRecord>,
        manifest_path: &Path,
        changes: &mut ChangeSet,
    ) {
        for (name, record) in new {
            let unchanged = baseline
                .get(name)
                .map(|old| old.hash == record.hash)
                .unwrap_or(false);
            if !unchanged {
                let local = self.root.join(&record.path);
                // A manifest living inside the root would otherwise be
                // admitted here and pin an earlier position; it is only
                // ever pushed as the final entry.
                if local == manifest_path {
                    continue;
                }
                changes.push(local);
            }
        }
    }
}
