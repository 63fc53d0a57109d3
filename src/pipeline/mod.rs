//! Publish pipeline module
//!
//! Wires the components into the run sequence: version bump, manifest
//! build, baseline fetch, diff, bounded-concurrency upload.

mod publish;

pub use publish::*;
