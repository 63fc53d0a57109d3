//! Remote blob store boundary
//!
//! The core treats the remote end purely as a hierarchical,
//! path-addressed blob store: fetch a blob, store a blob, make sure a
//! directory exists. It has no knowledge of the transport's session or
//! connection model beyond "each operation may independently fail".
//!
//! `SftpStore` is the concrete SSH/SFTP adapter; `RemoteLayout` owns the
//! control/content routing rule for remote paths.

mod layout;
mod sftp;

pub use layout::*;
pub use sftp::*;

use crate::error::Result;
use std::path::Path;

/// Directory-oriented blob store capability
///
/// Operations take `&mut self`: implementations wrap stateful transport
/// sessions, and the upload coordinator hands each in-flight task an
/// exclusive connection from a pool.
pub trait RemoteStore: Send {
    /// Fetch a remote blob; `RemoteNotFound` when the path is absent
    fn fetch(&mut self, remote_path: &str) -> Result<Vec<u8>>;

    /// Store a local file at the given remote path, returning bytes sent
    fn store(&mut self, local_path: &Path, remote_path: &str) -> Result<u64>;

    /// Create a remote directory chain if missing (idempotent)
    fn ensure_directory(&mut self, remote_dir: &str) -> Result<()>;
}
