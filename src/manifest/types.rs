//! Manifest data model and wire format
//!
//! The published document keys its files map by a dynamic
//! `patch_<major>.<minor>` name and wraps it in a single-element array:
//!
//! ```json
//! {
//!   "patch_1.4": [ { "data.txt": {"path": "...", "hash": "...", "size": 1} } ],
//!   "exe":       { "game.exe": {"path": "...", "hash": "...", "size": 2} },
//!   "patcher":   {"name": "...", "hash": "...", "size": 3, "path": "..."}
//! }
//! ```
//!
//! The wrapped array is a structural quirk downstream patchers depend on
//! and must be preserved. Because the patch key is dynamic, serialization
//! goes through `serde_json::Value` rather than a derived struct.

use crate::error::{IoResultExt, PatchForgeError, Result};
use crate::version::VersionTag;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// A single file's record in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the publish root, '/'-separated
    pub path: String,
    /// SHA-256 content hash, 64-char lowercase hex
    pub hash: String,
    /// File size in bytes (informational; hash is the equality criterion)
    pub size: u64,
}

/// The singleton self-updater executable record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatcherRecord {
    /// File name of the patcher executable
    pub name: String,
    /// SHA-256 content hash, 64-char lowercase hex
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Local path of the patcher executable
    pub path: String,
}

/// Versioned snapshot of a directory tree, partitioned into plain files,
/// executables and the singleton patcher.
///
/// Immutable once built; a new manifest is built from scratch on every
/// run. BTreeMap keys keep the map contents deterministic regardless of
/// traversal or hash completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Version this manifest will be published under
    pub version: VersionTag,
    /// Non-executable content, keyed by file name
    pub files: BTreeMap<String, FileRecord>,
    /// Executable artifacts other than the patcher, keyed by file name
    pub executables: BTreeMap<String, FileRecord>,
    /// The designated self-updater executable, if present
    pub patcher: Option<PatcherRecord>,
}

impl Manifest {
    /// Create an empty manifest for the given version
    pub fn new(version: VersionTag) -> Self {
        Self {
            version,
            files: BTreeMap::new(),
            executables: BTreeMap::new(),
            patcher: None,
        }
    }

    /// Render the published document form
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();

        let files: Map<String, Value> = self
            .files
            .iter()
            .map(|(name, rec)| (name.clone(), json!(rec)))
            .collect();
        // Single-element array wrapper: fixed wire-format quirk
        doc.insert(format!("patch_{}", self.version), json!([files]));

        let exe: Map<String, Value> = self
            .executables
            .iter()
            .map(|(name, rec)| (name.clone(), json!(rec)))
            .collect();
        doc.insert("exe".to_string(), Value::Object(exe));

        let patcher = match &self.patcher {
            Some(p) => json!(p),
            None => json!({}),
        };
        doc.insert("patcher".to_string(), patcher);

        Value::Object(doc)
    }

    /// Serialize the published document as pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_document())
            .map_err(|e| PatchForgeError::ManifestError(e.to_string()))
    }

    /// Write the published document to a local file
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_string()?).with_path(path)?;
        Ok(())
    }

    /// Total record count across all categories
    pub fn record_count(&self) -> usize {
        self.files.len() + self.executables.len() + usize::from(self.patcher.is_some())
    }
}

/// Parsed form of a previously published manifest document
///
/// A published document accumulates one `patch_*` key per historical
/// version; all of them are collected here so the differ can pick the
/// maximal one as its baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishedManifest {
    /// Historical files maps, keyed by their own version
    pub patches: BTreeMap<VersionTag, BTreeMap<String, FileRecord>>,
    /// Executables map of the document
    pub executables: BTreeMap<String, FileRecord>,
    /// Patcher singleton, absent when the document carried `{}`
    pub patcher: Option<PatcherRecord>,
}

impl PublishedManifest {
    /// Parse a published manifest document from raw bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| PatchForgeError::ManifestError(e.to_string()))?;
        let doc = value
            .as_object()
            .ok_or_else(|| PatchForgeError::ManifestError("document is not an object".into()))?;

        let mut parsed = Self::default();

        for (key, entry) in doc {
            if let Some(version) = key.strip_prefix("patch_") {
                // Keys with unparseable versions are skipped, not fatal
                let Ok(version) = version.parse::<VersionTag>() else {
                    continue;
                };
                // Unwrap the single-element array; tolerate a bare map
                let files_value = match entry {
                    Value::Array(items) => items.first().cloned().unwrap_or(json!({})),
                    other => other.clone(),
                };
                let files: BTreeMap<String, FileRecord> = serde_json::from_value(files_value)
                    .map_err(|e| PatchForgeError::ManifestError(e.to_string()))?;
                parsed.patches.insert(version, files);
            } else if key == "exe" {
                parsed.executables = serde_json::from_value(entry.clone())
                    .map_err(|e| PatchForgeError::ManifestError(e.to_string()))?;
            } else if key == "patcher" {
                let is_empty = entry.as_object().map(Map::is_empty).unwrap_or(false);
                if !is_empty {
                    parsed.patcher = Some(
                        serde_json::from_value(entry.clone())
                            .map_err(|e| PatchForgeError::ManifestError(e.to_string()))?,
                    );
                }
            }
        }

        Ok(parsed)
    }

    /// The files map of the numerically-maximal historical version
    pub fn latest_files(&self) -> Option<&BTreeMap<String, FileRecord>> {
        self.patches.last_key_value().map(|(_, files)| files)
    }

    /// The version of the most recent historical entry
    pub fn latest_version(&self) -> Option<VersionTag> {
        self.patches.last_key_value().map(|(v, _)| *v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, hash: &str, size: u64) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            hash: hash.to_string(),
            size,
        }
    }

    fn sample_manifest() -> Manifest {
        let mut manifest = Manifest::new(VersionTag::new(1, 4));
        manifest
            .files
            .insert("a.txt".to_string(), record("a.txt", "aa", 10));
        manifest
            .files
            .insert("b.txt".to_string(), record("sub/b.txt", "bb", 20));
        manifest
            .executables
            .insert("game.exe".to_string(), record("game.exe", "cc", 30));
        manifest.patcher = Some(PatcherRecord {
            name: "launcher.exe".to_string(),
            hash: "dd".to_string(),
            size: 40,
            path: "/update/patcher/launcher.exe".to_string(),
        });
        manifest
    }

    #[test]
    fn test_document_has_wrapped_array_quirk() {
        let doc = sample_manifest().to_document();
        let patch = &doc["patch_1.4"];
        assert!(patch.is_array());
        assert_eq!(patch.as_array().unwrap().len(), 1);
        assert!(patch[0].is_object());
        assert_eq!(patch[0]["a.txt"]["hash"], "aa");
        assert_eq!(doc["exe"]["game.exe"]["size"], 30);
        assert_eq!(doc["patcher"]["name"], "launcher.exe");
    }

    #[test]
    fn test_absent_patcher_serializes_as_empty_object() {
        let mut manifest = sample_manifest();
        manifest.patcher = None;
        let doc = manifest.to_document();
        assert_eq!(doc["patcher"], json!({}));
    }

    #[test]
    fn test_serialize_parse_roundtrip() {
        let manifest = sample_manifest();
        let json = manifest.to_json_string().unwrap();
        let parsed = PublishedManifest::from_slice(json.as_bytes()).unwrap();

        assert_eq!(parsed.latest_version(), Some(VersionTag::new(1, 4)));
        assert_eq!(parsed.latest_files().unwrap(), &manifest.files);
        assert_eq!(parsed.executables, manifest.executables);
        assert_eq!(parsed.patcher, manifest.patcher);
    }

    #[test]
    fn test_roundtrip_without_patcher() {
        let mut manifest = sample_manifest();
        manifest.patcher = None;
        let json = manifest.to_json_string().unwrap();
        let parsed = PublishedManifest::from_slice(json.as_bytes()).unwrap();
        assert!(parsed.patcher.is_none());
    }

    #[test]
    fn test_latest_files_picks_max_version() {
        let doc = json!({
            "patch_1.9": [ { "old.txt": {"path": "old.txt", "hash": "11", "size": 1} } ],
            "patch_1.10": [ { "new.txt": {"path": "new.txt", "hash": "22", "size": 2} } ],
            "patch_bogus": [ {} ],
            "exe": {},
            "patcher": {}
        });
        let parsed = PublishedManifest::from_slice(doc.to_string().as_bytes()).unwrap();

        // 1.10 beats 1.9 numerically, not lexically; bogus key skipped
        assert_eq!(parsed.latest_version(), Some(VersionTag::new(1, 10)));
        assert!(parsed.latest_files().unwrap().contains_key("new.txt"));
        assert_eq!(parsed.patches.len(), 2);
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = PublishedManifest::from_slice(b"[1, 2]").unwrap_err();
        assert!(matches!(err, PatchForgeError::ManifestError(_)));
    }
}
