//! Manifest construction and change detection
//!
//! Provides the versioned content-hash manifest:
//! - Manifest and record types plus the published wire format
//! - Directory walk, hashing and classification (builder)
//! - Change-set computation against a published baseline (differ)

mod builder;
mod diff;
mod types;

pub use builder::*;
pub use diff::*;
pub use types::*;
