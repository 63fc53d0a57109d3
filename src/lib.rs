//! # PatchForge - Incremental Update Publisher
//!
//! PatchForge distributes incremental software updates: it fingerprints
//! a local directory tree with content hashes, compares the fingerprint
//! against the last published state, and publishes only the changed
//! artifacts to a remote store, alongside a versioned manifest that
//! downstream patchers consume.
//!
//! ## Pipeline
//!
//! 1. **VersionStore** advances the two-part publish version.
//! 2. **ManifestBuilder** walks the update directory, hashing and
//!    classifying every file into plain content, executables, and the
//!    singleton patcher.
//! 3. The previously published manifest is fetched from the
//!    **RemoteStore** and used as the diff baseline.
//! 4. **ManifestDiffer** computes the change set; the manifest itself is
//!    always republished.
//! 5. **UploadCoordinator** uploads the change set with bounded
//!    parallelism, routing the manifest and patcher to the control
//!    directory and everything else under the content directory.
//!
//! ## Quick Start
//!
//! ```no_run
//! use patchforge::config::PublishConfig;
//! use patchforge::pipeline::Publisher;
//! use patchforge::remote::SftpStore;
//! use std::path::PathBuf;
//!
//! let config = PublishConfig {
//!     root: PathBuf::from("./update"),
//!     version_file: PathBuf::from("version.json"),
//!     manifest_path: PathBuf::from("patchlist.json"),
//!     control_dir: "patcher".to_string(),
//!     content_dir: "pack".to_string(),
//!     concurrency: 7,
//! };
//!
//! let remote = patchforge::config::RemoteConfig {
//!     host: "updates.example.com".to_string(),
//!     port: 22,
//!     user: "deploy".to_string(),
//!     password: None,
//!     key_path: None,
//! };
//!
//! let publisher = Publisher::new(config, move || SftpStore::connect(&remote));
//! let summary = publisher.run_publish().unwrap();
//! println!("published {} as version {}", summary.uploaded, summary.version);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod pipeline;
pub mod progress;
pub mod remote;
pub mod upload;
pub mod version;

// Re-export commonly used types
pub use error::{PatchForgeError, Result};
pub use manifest::{ChangeSet, Manifest, ManifestBuilder, ManifestDiffer};
pub use pipeline::{Publisher, PublishSummary};
pub use version::{VersionStore, VersionTag};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use patchforge::prelude::*;
    //! ```

    pub use crate::config::{CliArgs, PublishConfig, RemoteConfig};
    pub use crate::error::{PatchForgeError, Result};
    pub use crate::hash::{hash_bytes, hash_file, HashResult};
    pub use crate::manifest::{
        ChangeSet, FileRecord, Manifest, ManifestBuilder, ManifestDiffer, PatcherRecord,
        PublishedManifest,
    };
    pub use crate::pipeline::{Publisher, PublishSummary};
    pub use crate::progress::{ProgressEvent, ProgressReporter};
    pub use crate::remote::{RemoteLayout, RemoteStore, SftpStore};
    pub use crate::upload::{PublishResult, StorePool, UploadCoordinator};
    pub use crate::version::{VersionStore, VersionTag};
}
