//! Bounded-concurrency upload coordinator
//!
//! Dispatches one upload task per change-set entry onto a dedicated
//! worker pool of exactly N threads, so no more than N uploads are in
//! flight at once. An individual failure is recorded and reported but
//! never cancels or blocks sibling uploads; there is no retry within a
//! run. `publish` blocks until the whole batch has completed.

use crate::error::{PatchForgeError, Result};
use crate::manifest::ChangeSet;
use crate::progress::ProgressEvent;
use crate::remote::{RemoteLayout, RemoteStore};
use crate::upload::StorePool;
use crossbeam_channel::Sender;
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Default number of concurrent uploads
pub const DEFAULT_CONCURRENCY: usize = 7;

/// Outcome of a single upload task
#[derive(Debug, Clone)]
struct TaskOutcome {
    file_name: String,
    bytes: u64,
    error: Option<String>,
}

/// Aggregate result of a publish run
#[derive(Debug, Clone)]
pub struct PublishResult {
    /// Uploads dispatched
    pub attempted: usize,
    /// Uploads that completed successfully
    pub succeeded: usize,
    /// Uploads that failed
    pub failed: usize,
    /// Total bytes sent by successful uploads
    pub bytes_sent: u64,
    /// Failures as (file name, error message)
    pub failures: Vec<(String, String)>,
}

impl PublishResult {
    /// True when some but not necessarily all uploads failed
    pub fn is_partial(&self) -> bool {
        self.failed > 0
    }
}

/// Publishes change sets to a remote store with bounded parallelism
pub struct UploadCoordinator<R: RemoteStore> {
    pool: StorePool<R>,
    concurrency: usize,
    events: Option<Sender<ProgressEvent>>,
}

impl<R: RemoteStore> UploadCoordinator<R> {
    /// Create a coordinator with the given concurrency limit
    pub fn new<F>(concurrency: usize, factory: F) -> Self
    where
        F: Fn() -> Result<R> + Send + Sync + 'static,
    {
        let concurrency = concurrency.max(1);
        Self {
            pool: StorePool::new(concurrency, factory),
            concurrency,
            events: None,
        }
    }

    /// Attach a progress-event channel
    pub fn with_events(mut self, sender: Sender<ProgressEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Publish every change-set entry, blocking until the batch completes
    ///
    /// Returns aggregate counts; a run with `failed > 0` is still `Ok`,
    /// surfaced through `PublishResult::is_partial`.
    pub fn publish(&self, change_set: &ChangeSet, layout: &RemoteLayout) -> Result<PublishResult> {
        let attempted = change_set.len();
        self.emit(ProgressEvent::Started { attempted });

        // Exactly N worker threads is the admission bound: a new task
        // starts only once a running one has released its thread.
        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .build()
            .map_err(|e| PatchForgeError::config(e.to_string()))?;

        let completed = AtomicUsize::new(0);

        let outcomes: Vec<TaskOutcome> = workers.install(|| {
            change_set
                .paths()
                .par_iter()
                .map(|local| {
                    let outcome = self.upload_one(local, layout);
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;

                    match &outcome.error {
                        None => {
                            debug!(file = %outcome.file_name, "uploaded");
                            self.emit(ProgressEvent::Uploaded {
                                file_name: outcome.file_name.clone(),
                                completed: done,
                                attempted,
                            });
                        }
                        Some(message) => {
                            warn!(file = %outcome.file_name, error = %message, "upload failed");
                            self.emit(ProgressEvent::Failed {
                                file_name: outcome.file_name.clone(),
                                message: message.clone(),
                                completed: done,
                                attempted,
                            });
                        }
                    }

                    outcome
                })
                .collect()
        });

        let failures: Vec<(String, String)> = outcomes
            .iter()
            .filter_map(|o| o.error.as_ref().map(|e| (o.file_name.clone(), e.clone())))
            .collect();
        let failed = failures.len();
        let bytes_sent = outcomes.iter().map(|o| o.bytes).sum();
        let result = PublishResult {
            attempted,
            succeeded: attempted - failed,
            failed,
            bytes_sent,
            failures,
        };

        self.emit(ProgressEvent::Finished {
            succeeded: result.succeeded,
            failed: result.failed,
        });

        Ok(result)
    }

    fn upload_one(&self, local: &Path, layout: &RemoteLayout) -> TaskOutcome {
        let file_name = local
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| local.display().to_string());
        let remote_path = layout.remote_path_for(local);

        match self.try_upload(local, &remote_path) {
            Ok(bytes) => TaskOutcome {
                file_name,
                bytes,
                error: None,
            },
            Err(e) => TaskOutcome {
                file_name,
                bytes: 0,
                error: Some(e.to_string()),
            },
        }
    }

    fn try_upload(&self, local: &Path, remote_path: &str) -> Result<u64> {
        let mut conn = self.pool.get()?;
        let store = conn.get_mut();

        if let Some(dir) = RemoteLayout::parent_dir(remote_path) {
            store.ensure_directory(dir)?;
        }
        store.store(local, remote_path)
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(sender) = &self.events {
            // A hung-up reporter must not abort uploads
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, ManifestDiffer};
    use crate::remote::{DEFAULT_CONTENT_DIR, DEFAULT_CONTROL_DIR};
    use crate::version::VersionTag;
    use crossbeam_channel::unbounded;
    use std::collections::{HashMap, HashSet};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    /// In-memory remote store shared across pool connections, with
    /// in-flight instrumentation for the concurrency-bound test.
    #[derive(Clone, Default)]
    struct MemoryStore {
        blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        dirs: Arc<Mutex<HashSet<String>>>,
        fail_paths: Arc<HashSet<String>>,
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
    }

    impl MemoryStore {
        fn failing(paths: &[&str]) -> Self {
            Self {
                fail_paths: Arc::new(paths.iter().map(|s| s.to_string()).collect()),
                ..Self::default()
            }
        }
    }

    impl RemoteStore for MemoryStore {
        fn fetch(&mut self, remote_path: &str) -> Result<Vec<u8>> {
            self.blobs
                .lock()
                .unwrap()
                .get(remote_path)
                .cloned()
                .ok_or_else(|| PatchForgeError::RemoteNotFound(remote_path.to_string()))
        }

        fn store(&mut self, local_path: &Path, remote_path: &str) -> Result<u64> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(5));

            let result = if self.fail_paths.contains(remote_path) {
                Err(PatchForgeError::Transport(format!(
                    "injected failure: {remote_path}"
                )))
            } else {
                let content = std::fs::read(local_path)
                    .map_err(|e| PatchForgeError::io(local_path, e))?;
                let len = content.len() as u64;
                self.blobs
                    .lock()
                    .unwrap()
                    .insert(remote_path.to_string(), content);
                Ok(len)
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }

        fn ensure_directory(&mut self, remote_dir: &str) -> Result<()> {
            self.dirs.lock().unwrap().insert(remote_dir.to_string());
            Ok(())
        }
    }

    fn layout(root: &Path) -> RemoteLayout {
        RemoteLayout::new(
            root,
            DEFAULT_CONTROL_DIR,
            DEFAULT_CONTENT_DIR,
            "patchlist.json",
            None,
        )
    }

    fn change_set_of(root: &Path, files: &[&str]) -> (ChangeSet, PathBuf) {
        let mut manifest = Manifest::new(VersionTag::new(1, 1));
        for rel in files {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, rel.as_bytes()).unwrap();
            manifest.files.insert(
                rel.to_string(),
                crate::manifest::FileRecord {
                    path: rel.to_string(),
                    hash: rel.to_string(),
                    size: rel.len() as u64,
                },
            );
        }

        let manifest_path = root.join("patchlist.json");
        manifest.write_to(&manifest_path).unwrap();

        let changes = ManifestDiffer::new(root).diff(None, &manifest, &manifest_path);
        (changes, manifest_path)
    }

    #[test]
    fn test_publish_stores_all_entries() {
        let dir = TempDir::new().unwrap();
        let (changes, _) = change_set_of(dir.path(), &["a.txt", "sub/b.txt"]);

        let store = MemoryStore::default();
        let blobs = Arc::clone(&store.blobs);
        let coordinator = UploadCoordinator::new(4, move || Ok(store.clone()));

        let result = coordinator.publish(&changes, &layout(dir.path())).unwrap();

        assert_eq!(result.attempted, 3);
        assert_eq!(result.succeeded, 3);
        assert!(result.bytes_sent > 0);
        assert!(!result.is_partial());

        let blobs = blobs.lock().unwrap();
        assert!(blobs.contains_key("pack/a.txt"));
        assert!(blobs.contains_key("pack/sub/b.txt"));
        assert!(blobs.contains_key("patcher/patchlist.json"));
    }

    #[test]
    fn test_intermediate_directories_ensured() {
        let dir = TempDir::new().unwrap();
        let (changes, _) = change_set_of(dir.path(), &["deep/nested/c.dat"]);

        let store = MemoryStore::default();
        let dirs = Arc::clone(&store.dirs);
        let coordinator = UploadCoordinator::new(2, move || Ok(store.clone()));

        coordinator.publish(&changes, &layout(dir.path())).unwrap();

        let dirs = dirs.lock().unwrap();
        assert!(dirs.contains("pack/deep/nested"));
        assert!(dirs.contains("patcher"));
    }

    #[test]
    fn test_concurrency_never_exceeds_limit() {
        let dir = TempDir::new().unwrap();
        let files: Vec<String> = (0..12).map(|i| format!("f{i}.txt")).collect();
        let refs: Vec<&str> = files.iter().map(String::as_str).collect();
        let (changes, _) = change_set_of(dir.path(), &refs);

        for limit in [1, 3] {
            let store = MemoryStore::default();
            let max = Arc::clone(&store.max_in_flight);
            let coordinator = UploadCoordinator::new(limit, move || Ok(store.clone()));

            let result = coordinator.publish(&changes, &layout(dir.path())).unwrap();

            assert_eq!(result.failed, 0);
            assert!(
                max.load(Ordering::SeqCst) <= limit,
                "observed more than {limit} in-flight uploads"
            );
        }
    }

    #[test]
    fn test_single_failure_does_not_block_siblings() {
        let dir = TempDir::new().unwrap();
        let (changes, _) = change_set_of(dir.path(), &["a.txt", "b.txt", "c.txt"]);

        let store = MemoryStore::failing(&["pack/b.txt"]);
        let blobs = Arc::clone(&store.blobs);
        let coordinator = UploadCoordinator::new(2, move || Ok(store.clone()));

        let result = coordinator.publish(&changes, &layout(dir.path())).unwrap();

        assert_eq!(result.attempted, 4);
        assert_eq!(result.failed, 1);
        assert_eq!(result.succeeded, 3);
        assert!(result.is_partial());
        assert_eq!(result.failures[0].0, "b.txt");

        let blobs = blobs.lock().unwrap();
        assert!(blobs.contains_key("pack/a.txt"));
        assert!(blobs.contains_key("pack/c.txt"));
        assert!(!blobs.contains_key("pack/b.txt"));
    }

    #[test]
    fn test_progress_events_cover_every_task() {
        let dir = TempDir::new().unwrap();
        let (changes, _) = change_set_of(dir.path(), &["a.txt", "b.txt"]);

        let store = MemoryStore::failing(&["pack/a.txt"]);
        let (sender, receiver) = unbounded();
        let coordinator =
            UploadCoordinator::new(2, move || Ok(store.clone())).with_events(sender);

        coordinator.publish(&changes, &layout(dir.path())).unwrap();
        drop(coordinator);

        let events: Vec<ProgressEvent> = receiver.iter().collect();
        assert!(matches!(events.first(), Some(ProgressEvent::Started { attempted: 3 })));
        assert!(matches!(
            events.last(),
            Some(ProgressEvent::Finished { succeeded: 2, failed: 1 })
        ));

        let mut uploaded = 0;
        let mut failed = 0;
        for event in &events {
            match event {
                ProgressEvent::Uploaded { completed, attempted, .. } => {
                    uploaded += 1;
                    assert!(*completed <= *attempted);
                }
                ProgressEvent::Failed { .. } => failed += 1,
                _ => {}
            }
        }
        assert_eq!(uploaded, 2);
        assert_eq!(failed, 1);
    }
}
