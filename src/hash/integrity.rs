//! Streaming SHA-256 hashing
//!
//! All hashing goes through fixed-size chunked reads so memory stays
//! bounded regardless of file size. Digests are rendered as 64-character
//! lowercase hex strings, the sole equality criterion for change
//! detection.

use crate::error::{PatchForgeError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Default read buffer size (64 KiB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Hash of a file's content plus its size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashResult {
    /// SHA-256 digest as lowercase hex string (64 chars)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
}

impl std::fmt::Display for HashResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

/// Compute the SHA-256 hash and size of a file
pub fn hash_file(path: &Path) -> Result<HashResult> {
    hash_file_with_buffer(path, DEFAULT_BUFFER_SIZE)
}

/// Compute the SHA-256 hash of a file with a custom buffer size
pub fn hash_file_with_buffer(path: &Path, buffer_size: usize) -> Result<HashResult> {
    let file = File::open(path).map_err(|e| PatchForgeError::hash(path, e))?;
    let size = file
        .metadata()
        .map_err(|e| PatchForgeError::hash(path, e))?
        .len();
    let mut reader = BufReader::with_capacity(buffer_size, file);
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; buffer_size];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| PatchForgeError::hash(path, e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(HashResult {
        hash: hex::encode(hasher.finalize()),
        size,
    })
}

/// Compute the SHA-256 hash of in-memory data
pub fn hash_bytes(data: &[u8]) -> HashResult {
    let mut hasher = Sha256::new();
    hasher.update(data);
    HashResult {
        hash: hex::encode(hasher.finalize()),
        size: data.len() as u64,
    }
}
