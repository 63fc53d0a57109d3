//! Error types for PatchForge
//!
//! This module defines all error types used throughout the application,
//! providing detailed error information for debugging and user feedback.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for PatchForge operations
#[derive(Error, Debug)]
pub enum PatchForgeError {
    /// I/O error during file operations
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persisted version state is malformed; requires manual correction
    #[error("Malformed version '{0}': expected \"major.minor\" with non-negative integers")]
    VersionFormat(String),

    /// A file could not be read while building the manifest
    #[error("Failed to hash '{path}': {source}")]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote path does not exist (non-fatal for baseline fetches)
    #[error("Remote path not found: {0}")]
    RemoteNotFound(String),

    /// Connection to the remote store could not be established
    #[error("Connection error to '{host}': {message}")]
    ConnectionError { host: String, message: String },

    /// Authentication with the remote store failed
    #[error("Authentication failed for '{user}@{host}': {message}")]
    AuthenticationError {
        user: String,
        host: String,
        message: String,
    },

    /// A single remote fetch/store/mkdir operation failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Manifest serialization or parsing error
    #[error("Manifest error: {0}")]
    ManifestError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PatchForgeError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a hash error with path context
    pub fn hash(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Hash {
            path: path.into(),
            source,
        }
    }

    /// Create a connection error
    pub fn connection(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionError {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(
        user: impl Into<String>,
        host: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::AuthenticationError {
            user: user.into(),
            host: host.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Check if this error means a remote path was simply absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RemoteNotFound(_))
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } | Self::Hash { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for PatchForge operations
pub type Result<T> = std::result::Result<T, PatchForgeError>;

impl From<serde_json::Error> for PatchForgeError {
    fn from(err: serde_json::Error) -> Self {
        PatchForgeError::ManifestError(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| PatchForgeError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = PatchForgeError::io("/test/path", io_err);
        assert!(err.path().is_some());
        assert_eq!(err.path().unwrap(), &PathBuf::from("/test/path"));
    }

    #[test]
    fn test_not_found_detection() {
        let err = PatchForgeError::RemoteNotFound("patcher/patchlist.json".to_string());
        assert!(err.is_not_found());

        let err = PatchForgeError::Transport("connection reset".to_string());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_version_format_message() {
        let err = PatchForgeError::VersionFormat("1.2.3".to_string());
        assert!(err.to_string().contains("1.2.3"));
    }
}
