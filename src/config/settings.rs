//! Configuration settings for PatchForge
//!
//! Defines CLI arguments and the runtime configuration for a publish
//! run.

use crate::error::{PatchForgeError, Result};
use crate::remote::{DEFAULT_CONTENT_DIR, DEFAULT_CONTROL_DIR};
use crate::upload::DEFAULT_CONCURRENCY;
use clap::Parser;
use std::path::PathBuf;

/// Default local version file
pub const DEFAULT_VERSION_FILE: &str = "version.json";

/// Default manifest file name (local and remote)
pub const DEFAULT_MANIFEST_NAME: &str = "patchlist.json";

/// PatchForge - incremental update publisher
#[derive(Parser, Debug, Clone)]
#[command(name = "patchforge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Publish incremental software updates to a remote store")]
#[command(long_about = r#"
PatchForge fingerprints a local update directory with content hashes,
compares the result against the last published manifest on the remote
store, and uploads only the changed artifacts plus a freshly versioned
manifest.

Examples:
  patchforge ./update --host updates.example.com --user deploy
  patchforge ./update --manifest-only          # build patchlist.json locally
  patchforge ./update --host h --user u --concurrency 4
"#)]
pub struct CliArgs {
    /// Update directory to publish
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Remote store host
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Remote store SSH port
    #[arg(long, default_value = "22", value_name = "PORT")]
    pub port: u16,

    /// Remote store user
    #[arg(long, value_name = "USER")]
    pub user: Option<String>,

    /// Remote store password (prefer the env var over the flag)
    #[arg(long, env = "PATCHFORGE_PASSWORD", value_name = "PASSWORD")]
    pub password: Option<String>,

    /// SSH private key path (agent is tried when neither key nor
    /// password is given)
    #[arg(long, value_name = "PATH")]
    pub key: Option<PathBuf>,

    /// Maximum concurrent uploads
    #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY, value_name = "NUM")]
    pub concurrency: usize,

    /// Remote control directory (manifest + patcher executable)
    #[arg(long, default_value = DEFAULT_CONTROL_DIR, value_name = "DIR")]
    pub control_dir: String,

    /// Remote content directory (mirrors the local tree)
    #[arg(long, default_value = DEFAULT_CONTENT_DIR, value_name = "DIR")]
    pub content_dir: String,

    /// Local version file
    #[arg(long, default_value = DEFAULT_VERSION_FILE, value_name = "PATH")]
    pub version_file: PathBuf,

    /// Local manifest file to write
    #[arg(long, default_value = DEFAULT_MANIFEST_NAME, value_name = "PATH")]
    pub manifest: PathBuf,

    /// Build and write the manifest locally without uploading
    #[arg(long)]
    pub manifest_only: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Immutable configuration for a publish run
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Root directory being published
    pub root: PathBuf,
    /// Local version file path
    pub version_file: PathBuf,
    /// Local manifest file path
    pub manifest_path: PathBuf,
    /// Remote control directory segment
    pub control_dir: String,
    /// Remote content directory segment
    pub content_dir: String,
    /// Maximum concurrent uploads
    pub concurrency: usize,
}

impl PublishConfig {
    /// Build from parsed CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let root = args
            .directory
            .clone()
            .ok_or_else(|| PatchForgeError::config("no update directory given"))?;

        if !root.is_dir() {
            return Err(PatchForgeError::config(format!(
                "not a directory: {}",
                root.display()
            )));
        }

        if args.concurrency == 0 {
            return Err(PatchForgeError::config("concurrency must be at least 1"));
        }

        Ok(Self {
            root,
            version_file: args.version_file.clone(),
            manifest_path: args.manifest.clone(),
            control_dir: args.control_dir.clone(),
            content_dir: args.content_dir.clone(),
            concurrency: args.concurrency,
        })
    }

    /// File name of the manifest, as routed on the remote store
    pub fn manifest_name(&self) -> String {
        self.manifest_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_MANIFEST_NAME.to_string())
    }
}

/// Connection parameters for the remote store
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Host name or address
    pub host: String,
    /// SSH port
    pub port: u16,
    /// User name
    pub user: String,
    /// Password authentication, if given
    pub password: Option<String>,
    /// Key-file authentication, if given
    pub key_path: Option<PathBuf>,
}

impl RemoteConfig {
    /// Build from parsed CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let host = args
            .host
            .clone()
            .ok_or_else(|| PatchForgeError::config("no remote host given (--host)"))?;
        let user = args
            .user
            .clone()
            .ok_or_else(|| PatchForgeError::config("no remote user given (--user)"))?;

        Ok(Self {
            host,
            port: args.port,
            user,
            password: args.password.clone(),
            key_path: args.key.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["patchforge"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let dir_arg = dir.path().to_string_lossy().into_owned();
        let config = PublishConfig::from_cli(&args(&[&dir_arg])).unwrap();

        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.control_dir, "patcher");
        assert_eq!(config.content_dir, "pack");
        assert_eq!(config.manifest_name(), "patchlist.json");
    }

    #[test]
    fn test_missing_directory_is_config_error() {
        let err = PublishConfig::from_cli(&args(&[])).unwrap_err();
        assert!(matches!(err, PatchForgeError::ConfigError(_)));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let dir = TempDir::new().unwrap();
        let dir_arg = dir.path().to_string_lossy().into_owned();
        let err = PublishConfig::from_cli(&args(&[&dir_arg, "-j", "0"])).unwrap_err();
        assert!(matches!(err, PatchForgeError::ConfigError(_)));
    }

    #[test]
    fn test_remote_config_requires_host_and_user() {
        let parsed = args(&["dir", "--host", "example.com"]);
        assert!(RemoteConfig::from_cli(&parsed).is_err());

        let parsed = args(&["dir", "--host", "example.com", "--user", "deploy"]);
        let remote = RemoteConfig::from_cli(&parsed).unwrap();
        assert_eq!(remote.host, "example.com");
        assert_eq!(remote.port, 22);
    }
}
