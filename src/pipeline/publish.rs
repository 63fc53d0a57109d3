//! Publish orchestration
//!
//! A run owns its manifest and change set; the version file is the only
//! local state that survives, and the remote store is the authority for
//! the previously published manifest. The version is persisted after a
//! successful build and before uploads, so a failed build never
//! advances the counter while a partially failed publish still does.

use crate::config::PublishConfig;
use crate::error::Result;
use crate::manifest::{Manifest, ManifestBuilder, ManifestDiffer, PublishedManifest};
use crate::progress::ProgressEvent;
use crate::remote::{RemoteLayout, RemoteStore};
use crate::upload::UploadCoordinator;
use crate::version::{VersionStore, VersionTag};
use crossbeam_channel::Sender;
use std::sync::Arc;
use tracing::{info, warn};

/// Final outcome of a publish run
#[derive(Debug, Clone)]
pub struct PublishSummary {
    /// Version the run was published under
    pub version: VersionTag,
    /// Regular files visited by the manifest build
    pub total_files: usize,
    /// Uploads dispatched (changed files + manifest)
    pub attempted: usize,
    /// Uploads that completed successfully
    pub uploaded: usize,
    /// Uploads that failed
    pub failed: usize,
    /// Total bytes sent by successful uploads
    pub bytes_sent: u64,
    /// Failures as (file name, error message)
    pub failures: Vec<(String, String)>,
}

impl PublishSummary {
    /// True when some uploads failed
    pub fn is_partial(&self) -> bool {
        self.failed > 0
    }

    /// Print a summary of the publish run
    pub fn print_summary(&self) {
        use humansize::{format_size, BINARY};

        println!("\n=== Publish Summary ===");
        println!("Version:   {}", self.version);
        println!("Files:     {}", self.total_files);
        println!("Attempted: {}", self.attempted);
        println!("Succeeded: {}", self.uploaded);
        println!("Failed:    {}", self.failed);
        println!("Sent:      {}", format_size(self.bytes_sent, BINARY));

        if !self.failures.is_empty() {
            println!("\nFailures:");
            for (name, err) in &self.failures {
                println!("  {} - {}", name, err);
            }
        }
    }
}

/// Runs the manifest-diff-and-publish pipeline
pub struct Publisher<R: RemoteStore> {
    config: PublishConfig,
    factory: Arc<dyn Fn() -> Result<R> + Send + Sync>,
    events: Option<Sender<ProgressEvent>>,
}

impl<R: RemoteStore + 'static> Publisher<R> {
    /// Create a publisher from config plus a store-connection factory
    pub fn new<F>(config: PublishConfig, factory: F) -> Self
    where
        F: Fn() -> Result<R> + Send + Sync + 'static,
    {
        Self {
            config,
            factory: Arc::new(factory),
            events: None,
        }
    }

    /// Attach a progress-event channel
    pub fn with_events(mut self, sender: Sender<ProgressEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Build the next manifest and write it locally, without uploading
    ///
    /// Bumps and persists the version exactly like a full publish run:
    /// load, increment, build, then save only once the build succeeded.
    pub fn generate_manifest(&self) -> Result<(Manifest, usize)> {
        let version_store = VersionStore::new(&self.config.version_file);
        let version = version_store.load()?.increment();

        let builder = ManifestBuilder::new(&self.config.root);
        let (manifest, total_files) = builder.build(version)?;

        version_store.save(version)?;
        manifest.write_to(&self.config.manifest_path)?;

        info!(
            version = %version,
            files = total_files,
            manifest = %self.config.manifest_path.display(),
            "manifest generated"
        );

        Ok((manifest, total_files))
    }

    /// Run the full pipeline: bump, build, fetch baseline, diff, upload
    pub fn run_publish(&self) -> Result<PublishSummary> {
        let (manifest, total_files) = self.generate_manifest()?;

        let layout = RemoteLayout::new(
            &self.config.root,
            &self.config.control_dir,
            &self.config.content_dir,
            self.config.manifest_name(),
            manifest.patcher.as_ref().map(|p| p.name.clone()),
        );

        let baseline = self.fetch_baseline(&layout)?;
        if baseline.is_none() {
            info!("no published baseline; treating as first publish");
        }

        let differ = ManifestDiffer::new(&self.config.root);
        let changes = differ.diff(baseline.as_ref(), &manifest, &self.config.manifest_path);

        let factory = Arc::clone(&self.factory);
        let mut coordinator =
            UploadCoordinator::new(self.config.concurrency, move || factory());
        if let Some(sender) = &self.events {
            coordinator = coordinator.with_events(sender.clone());
        }

        let result = coordinator.publish(&changes, &layout)?;
        if result.is_partial() {
            warn!(
                failed = result.failed,
                attempted = result.attempted,
                "publish completed with failures"
            );
        }

        Ok(PublishSummary {
            version: manifest.version,
            total_files,
            attempted: result.attempted,
            uploaded: result.succeeded,
            failed: result.failed,
            bytes_sent: result.bytes_sent,
            failures: result.failures,
        })
    }

    /// Fetch and parse the previously published manifest
    ///
    /// Absence means first publish. A fetch or parse failure degrades to
    /// an empty baseline (everything gets re-published) rather than
    /// aborting the run.
    fn fetch_baseline(&self, layout: &RemoteLayout) -> Result<Option<PublishedManifest>> {
        let mut store = (self.factory)()?;
        let remote_path = layout.manifest_remote_path();

        let bytes = match store.fetch(&remote_path) {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => {
                warn!(path = %remote_path, error = %e, "baseline fetch failed; republishing everything");
                return Ok(None);
            }
        };

        match PublishedManifest::from_slice(&bytes) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                warn!(path = %remote_path, error = %e, "baseline unparseable; republishing everything");
                Ok(None)
            }
        }
    }
}
