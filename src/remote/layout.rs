//! Remote path routing
//!
//! The serialized manifest and the designated patcher executable live in
//! a fixed control directory; every other artifact mirrors its local
//! path relative to the publish root under the content directory.

use std::path::{Path, PathBuf};

/// Default control directory on the remote store
pub const DEFAULT_CONTROL_DIR: &str = "patcher";

/// Default content directory on the remote store
pub const DEFAULT_CONTENT_DIR: &str = "pack";

/// Routing table from local paths to remote paths
#[derive(Debug, Clone)]
pub struct RemoteLayout {
    root: PathBuf,
    control_dir: String,
    content_dir: String,
    manifest_name: String,
    patcher_name: Option<String>,
}

impl RemoteLayout {
    /// Create a layout for the given publish root
    pub fn new(
        root: impl Into<PathBuf>,
        control_dir: impl Into<String>,
        content_dir: impl Into<String>,
        manifest_name: impl Into<String>,
        patcher_name: Option<String>,
    ) -> Self {
        Self {
            root: root.into(),
            control_dir: control_dir.into(),
            content_dir: content_dir.into(),
            manifest_name: manifest_name.into(),
            patcher_name,
        }
    }

    /// The fixed control directory path segment
    pub fn control_dir(&self) -> &str {
        &self.control_dir
    }

    /// Remote path of the published manifest document
    pub fn manifest_remote_path(&self) -> String {
        format!("{}/{}", self.control_dir, self.manifest_name)
    }

    /// Compute the remote path for a local change-set entry
    ///
    /// Remote paths are '/'-separated regardless of the host platform.
    pub fn remote_path_for(&self, local: &Path) -> String {
        let name = local
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let is_control =
            name == self.manifest_name || self.patcher_name.as_deref() == Some(name.as_str());
        if is_control {
            return format!("{}/{}", self.control_dir, name);
        }

        let relative = local.strip_prefix(&self.root).unwrap_or(local);
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        format!("{}/{}", self.content_dir, relative)
    }

    /// Remote parent directory of a remote path, if any
    pub fn parent_dir(remote_path: &str) -> Option<&str> {
        remote_path.rsplit_once('/').map(|(dir, _)| dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> RemoteLayout {
        RemoteLayout::new(
            "/update",
            DEFAULT_CONTROL_DIR,
            DEFAULT_CONTENT_DIR,
            "patchlist.json",
            Some("launcher.exe".to_string()),
        )
    }

    #[test]
    fn test_manifest_routes_to_control_dir() {
        let layout = layout();
        assert_eq!(
            layout.remote_path_for(Path::new("patchlist.json")),
            "patcher/patchlist.json"
        );
        assert_eq!(layout.manifest_remote_path(), "patcher/patchlist.json");
    }

    #[test]
    fn test_patcher_routes_to_control_dir() {
        let layout = layout();
        assert_eq!(
            layout.remote_path_for(Path::new("/update/patcher/launcher.exe")),
            "patcher/launcher.exe"
        );
    }

    #[test]
    fn test_content_mirrors_relative_path() {
        let layout = layout();
        assert_eq!(
            layout.remote_path_for(Path::new("/update/a.txt")),
            "pack/a.txt"
        );
        assert_eq!(
            layout.remote_path_for(Path::new("/update/sub/dir/b.dat")),
            "pack/sub/dir/b.dat"
        );
    }

    #[test]
    fn test_no_patcher_name_means_no_patcher_routing() {
        let layout = RemoteLayout::new(
            "/update",
            DEFAULT_CONTROL_DIR,
            DEFAULT_CONTENT_DIR,
            "patchlist.json",
            None,
        );
        assert_eq!(
            layout.remote_path_for(Path::new("/update/launcher.exe")),
            "pack/launcher.exe"
        );
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(RemoteLayout::parent_dir("pack/sub/f.txt"), Some("pack/sub"));
        assert_eq!(RemoteLayout::parent_dir("f.txt"), None);
    }
}
