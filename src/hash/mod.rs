//! Content hashing module
//!
//! Provides streaming SHA-256 file hashing with bounded memory,
//! producing the 64-character lowercase hex digests recorded in
//! manifests.

mod integrity;

pub use integrity::*;
