//! Gangway - connection layer for remote file deployment
//!
//! Gangway turns a declarative server description (protocol, host,
//! credentials, permissions) into a ready-to-use remote filesystem handle,
//! so the rest of a deployment pipeline (diffing, uploading, deleting) never
//! needs to know whether the wire speaks FTP, FTPS or SFTP.
//!
//! ```no_run
//! use gangway::{Connection, ServerConfig};
//!
//! let config = ServerConfig {
//!     scheme: Some("sftp".to_string()),
//!     host: Some("deploy.example.com".to_string()),
//!     user: Some("deploy".to_string()),
//!     privkey: Some("~/.ssh/id_deploy".to_string()),
//!     path: Some("/var/www".to_string()),
//!     ..ServerConfig::default()
//! };
//!
//! let mut connection = Connection::open(&config)?;
//! let listing = connection.filesystem().list(std::path::Path::new("."))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod auth;
pub mod config;
pub mod connection;
pub mod error;
pub mod fs;
pub mod options;

// Re-exports for convenience
pub use auth::{expand_home, resolve_credential, Credential, PrivateKey};
pub use config::{load_servers, load_servers_from_path, ServerConfig};
pub use connection::Connection;
pub use error::{ConnectError, ConnectResult, ErrorKind};
pub use fs::{FilePermissions, FsError, FsResult, RemoteEntry, RemoteFilesystem, Visibility};
pub use options::{ConnectionOptions, Protocol, DEFAULT_TIMEOUT_SECS};
