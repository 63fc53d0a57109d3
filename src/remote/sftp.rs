//! SSH/SFTP blob store adapter
//!
//! Implements `RemoteStore` over an SFTP channel with streamed transfers
//! and create-if-missing directory handling. Authentication tries
//! password, then key file, then the SSH agent.

use crate::config::RemoteConfig;
use crate::error::{PatchForgeError, Result};
use crate::remote::RemoteStore;
use ssh2::{ErrorCode, Session, Sftp};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};

/// Transfer buffer size (1 MiB)
const BUFFER_SIZE: usize = 1024 * 1024;

// LIBSSH2_FX_NO_SUCH_FILE
const SFTP_NO_SUCH_FILE: i32 = 2;

/// SFTP-backed remote store connection
pub struct SftpStore {
    #[allow(dead_code)]
    session: Session,
    sftp: Sftp,
}

impl SftpStore {
    /// Connect and authenticate against the configured host
    pub fn connect(config: &RemoteConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let tcp = TcpStream::connect(&addr)
            .map_err(|e| PatchForgeError::connection(&config.host, e.to_string()))?;

        let mut session = Session::new()
            .map_err(|e| PatchForgeError::connection(&config.host, e.to_string()))?;

        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| PatchForgeError::connection(&config.host, e.to_string()))?;

        Self::authenticate(&mut session, config)?;

        let sftp = session
            .sftp()
            .map_err(|e| PatchForgeError::connection(&config.host, e.to_string()))?;

        Ok(Self { session, sftp })
    }

    fn authenticate(session: &mut Session, config: &RemoteConfig) -> Result<()> {
        if let Some(password) = &config.password {
            session
                .userauth_password(&config.user, password)
                .map_err(|e| PatchForgeError::auth(&config.user, &config.host, e.to_string()))?;
        } else if let Some(key_path) = &config.key_path {
            session
                .userauth_pubkey_file(&config.user, None, key_path, None)
                .map_err(|e| PatchForgeError::auth(&config.user, &config.host, e.to_string()))?;
        } else {
            let mut agent = session
                .agent()
                .map_err(|e| PatchForgeError::auth(&config.user, &config.host, e.to_string()))?;

            agent
                .connect()
                .map_err(|e| PatchForgeError::auth(&config.user, &config.host, e.to_string()))?;

            agent
                .list_identities()
                .map_err(|e| PatchForgeError::auth(&config.user, &config.host, e.to_string()))?;

            let identities: Vec<_> = agent.identities().unwrap_or_default();

            let mut authenticated = false;
            for identity in identities {
                if agent.userauth(&config.user, &identity).is_ok() {
                    authenticated = true;
                    break;
                }
            }

            if !authenticated {
                return Err(PatchForgeError::auth(
                    &config.user,
                    &config.host,
                    "No valid SSH key found in agent",
                ));
            }
        }

        if !session.authenticated() {
            return Err(PatchForgeError::auth(
                &config.user,
                &config.host,
                "Authentication failed",
            ));
        }

        Ok(())
    }

    fn map_sftp_error(err: ssh2::Error, remote_path: &str) -> PatchForgeError {
        match err.code() {
            ErrorCode::SFTP(SFTP_NO_SUCH_FILE) => {
                PatchForgeError::RemoteNotFound(remote_path.to_string())
            }
            _ => PatchForgeError::Transport(format!("{remote_path}: {err}")),
        }
    }
}

impl RemoteStore for SftpStore {
    fn fetch(&mut self, remote_path: &str) -> Result<Vec<u8>> {
        let mut remote_file = self
            .sftp
            .open(Path::new(remote_path))
            .map_err(|e| Self::map_sftp_error(e, remote_path))?;

        let mut content = Vec::new();
        remote_file
            .read_to_end(&mut content)
            .map_err(|e| PatchForgeError::Transport(format!("{remote_path}: {e}")))?;

        Ok(content)
    }

    fn store(&mut self, local_path: &Path, remote_path: &str) -> Result<u64> {
        let local_file = std::fs::File::open(local_path)
            .map_err(|e| PatchForgeError::io(local_path, e))?;

        let mut remote_file = self
            .sftp
            .create(Path::new(remote_path))
            .map_err(|e| PatchForgeError::Transport(format!("{remote_path}: {e}")))?;

        let mut reader = std::io::BufReader::with_capacity(BUFFER_SIZE, local_file);
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut bytes_sent = 0u64;

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .map_err(|e| PatchForgeError::io(local_path, e))?;

            if bytes_read == 0 {
                break;
            }

            remote_file
                .write_all(&buffer[..bytes_read])
                .map_err(|e| PatchForgeError::Transport(format!("{remote_path}: {e}")))?;

            bytes_sent += bytes_read as u64;
        }

        Ok(bytes_sent)
    }

    fn ensure_directory(&mut self, remote_dir: &str) -> Result<()> {
        let mut current = PathBuf::new();

        for segment in remote_dir.split('/').filter(|s| !s.is_empty()) {
            current.push(segment);

            // Concurrent tasks race to create shared parents. Losing the
            // race must count as success, so a failed mkdir is only fatal
            // when the directory still does not exist afterwards.
            if let Err(mkdir_err) = self.sftp.mkdir(&current, 0o755) {
                match self.sftp.stat(&current) {
                    Ok(stat) if stat.is_dir() => {}
                    Ok(_) => {
                        return Err(PatchForgeError::Transport(format!(
                            "remote path exists but is not a directory: {}",
                            current.display()
                        )));
                    }
                    Err(_) => return Err(Self::map_sftp_error(mkdir_err, remote_dir)),
                }
            }
        }

        Ok(())
    }
}
