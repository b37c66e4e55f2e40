//! Error types for connection establishment
//!
//! Uses `thiserror` for library errors. Every variant belongs to exactly one
//! [`ErrorKind`]: configuration and credential errors indicate a caller
//! mistake and should abort the call chain; transport errors come from the
//! wire and may be worth reporting per-server without aborting a batch.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for connection operations
pub type ConnectResult<T> = Result<T, ConnectError>;

/// Broad classification of a [`ConnectError`].
///
/// Batch callers (deploying to several servers in a loop) typically abort on
/// `Configuration` and `Credential` errors but keep going past `Transport`
/// failures on individual targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server configuration itself is wrong; retrying cannot help.
    Configuration,
    /// Authentication material could not be resolved; retrying cannot help.
    Credential,
    /// The session could not be negotiated; the target may come back.
    Transport,
}

/// Main error type for connection establishment
#[derive(Error, Debug)]
pub enum ConnectError {
    /// No `scheme` field in the server configuration
    #[error("no connection protocol specified; expected one of 'ftp', 'ftps' or 'sftp'")]
    MissingScheme,

    /// `scheme` is set but not one of the supported protocols
    #[error("unknown connection protocol '{scheme}'; expected one of 'ftp', 'ftps' or 'sftp'")]
    UnknownScheme { scheme: String },

    /// A field the selected protocol needs was not provided
    #[error("missing required field '{field}' in server configuration")]
    MissingField { field: &'static str },

    /// Private key is neither an existing file nor inline PEM material
    #[error("private key {} does not exist", .path.display())]
    PrivateKeyNotFound { path: PathBuf },

    /// Operation needs the lower-level SSH session, which only SFTP has
    #[error("operation '{operation}' requires an SFTP connection")]
    SftpOnly { operation: &'static str },

    /// Server configuration document could not be parsed
    #[error("invalid server configuration: {0}")]
    InvalidConfig(#[from] toml::de::Error),

    /// IO error (reading a configuration file or a local key)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure raised by the transport library during session negotiation
    #[error("failed to connect to {host}: {message}")]
    Transport { host: String, message: String },
}

impl ConnectError {
    /// Classify this error for callers that branch on retryability.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConnectError::MissingScheme
            | ConnectError::UnknownScheme { .. }
            | ConnectError::MissingField { .. }
            | ConnectError::SftpOnly { .. }
            | ConnectError::InvalidConfig(_) => ErrorKind::Configuration,
            ConnectError::PrivateKeyNotFound { .. } => ErrorKind::Credential,
            ConnectError::Io(_) | ConnectError::Transport { .. } => ErrorKind::Transport,
        }
    }
}
