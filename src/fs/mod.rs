//! Remote filesystem capability
//!
//! [`RemoteFilesystem`] is the uniform handle the deployment pipeline works
//! against: the same read/write/delete/list/permission operations whether
//! the wire underneath speaks FTP or SFTP. The builder hands out
//! `Box<dyn RemoteFilesystem>`; per-protocol option shapes and error
//! surfaces never leak past this boundary.
//!
//! Implementations:
//! - [`FtpFilesystem`] — suppaftp-backed, plain FTP or explicit TLS
//! - [`SftpFilesystem`] — ssh2-backed SFTP

pub mod ftp;
pub mod sftp;

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use ftp::FtpFilesystem;
pub use sftp::SftpFilesystem;

use crate::error::{ConnectError, ConnectResult};
use crate::options::ConnectionOptions;

/// Result type for remote filesystem operations
pub type FsResult<T> = Result<T, FsError>;

/// Remote filesystem operation errors
#[derive(Error, Debug)]
pub enum FsError {
    /// Remote path does not exist
    #[error("remote path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Remote server refused the operation
    #[error("remote operation '{op}' failed: {message}")]
    Operation { op: &'static str, message: String },

    /// Local I/O error while staging data
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which file-permission slot a written file takes.
///
/// Deployment pipelines mark most uploads public (web-served content) and
/// the occasional secret private; the connection's configured permission
/// bits for the matching slot are applied after the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Permission bits a connection was configured with.
///
/// Unset slots mean "leave it to the server"; no defaults are invented
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilePermissions {
    pub public: Option<u32>,
    pub private: Option<u32>,
    pub directory: Option<u32>,
}

impl FilePermissions {
    pub(crate) fn from_options(options: &ConnectionOptions) -> Self {
        FilePermissions {
            public: options.perm_public,
            private: options.perm_private,
            directory: options.directory_perm,
        }
    }

    /// Mode to apply to a file written with the given visibility, if any.
    pub fn file_mode(&self, visibility: Visibility) -> Option<u32> {
        match visibility {
            Visibility::Public => self.public,
            Visibility::Private => self.private,
        }
    }
}

/// Directory entry returned by [`RemoteFilesystem::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Entry name, without its parent path
    pub name: String,
    pub is_dir: bool,
    /// Size in bytes; 0 for directories on servers that report none
    pub size: u64,
}

/// Uniform interface over an authenticated remote session.
///
/// Paths are interpreted relative to the connection's configured root;
/// absolute paths are passed through as given. Operations take `&mut self`
/// because both underlying transports drive a single command channel.
pub trait RemoteFilesystem {
    /// Read a remote file into memory
    fn read(&mut self, path: &Path) -> FsResult<Vec<u8>>;

    /// Write a remote file as public content, creating parent directories
    /// as needed.
    fn write(&mut self, path: &Path, content: &[u8]) -> FsResult<()> {
        self.write_with_visibility(path, content, Visibility::Public)
    }

    /// Write a remote file, creating parent directories as needed.
    ///
    /// Applies the configured file permission bits for the given
    /// visibility afterwards, when the configuration set any.
    fn write_with_visibility(
        &mut self,
        path: &Path,
        content: &[u8],
        visibility: Visibility,
    ) -> FsResult<()>;

    /// Delete a remote file
    fn delete(&mut self, path: &Path) -> FsResult<()>;

    /// List a remote directory
    fn list(&mut self, path: &Path) -> FsResult<Vec<RemoteEntry>>;

    /// Check whether a remote path exists
    fn exists(&mut self, path: &Path) -> bool;

    /// Create a directory and any missing parents.
    ///
    /// Applies the configured directory permission bits to directories this
    /// call creates, when the configuration set any.
    fn create_dir_all(&mut self, path: &Path) -> FsResult<()>;

    /// Change permission bits on a remote path
    fn set_permissions(&mut self, path: &Path, mode: u32) -> FsResult<()>;
}

/// Join a deployment path onto the configured remote root.
pub(crate) fn join_root(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Resolve `host:port` to a socket address for the transport to dial.
///
/// Resolution failure is a transport error: the configuration named a host,
/// the environment could not turn it into an address.
pub(crate) fn resolve_addr(host: &str, port: u16) -> ConnectResult<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .map_err(|err| ConnectError::Transport {
            host: host.to_string(),
            message: err.to_string(),
        })?
        .next()
        .ok_or_else(|| ConnectError::Transport {
            host: host.to_string(),
            message: format!("host '{host}' did not resolve to any address"),
        })
}
