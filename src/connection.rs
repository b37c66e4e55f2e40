//! Connection builder
//!
//! Turns a [`ServerConfig`] into a live [`Connection`]: validates the
//! scheme, normalizes options, resolves the credential and dispatches to
//! the protocol constructor. There is no retry state machine here — a
//! failed [`Connection::open`] is simply called again, and every call is
//! independent of every other.

use std::io::Read;

use log::{debug, warn};
use ssh2::Session;

use crate::auth::resolve_credential;
use crate::config::ServerConfig;
use crate::error::{ConnectError, ConnectResult, ErrorKind};
use crate::fs::sftp::establish_session;
use crate::fs::{FtpFilesystem, RemoteFilesystem, SftpFilesystem};
use crate::options::{ConnectionOptions, Protocol};

/// An established connection to one deployment target.
///
/// Owns the uniform [`RemoteFilesystem`] handle and, for SFTP, the
/// underlying authenticated [`Session`] (the connection provider) for
/// callers that need lower-level access than the filesystem capability
/// offers. Neither is shared with any other `Connection`.
pub struct Connection {
    host: String,
    filesystem: Box<dyn RemoteFilesystem>,
    session: Option<Session>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Connect to the server a configuration describes.
    ///
    /// Configuration and credential errors fail fast — they need a config
    /// change, not a retry. Transport failures are additionally logged at
    /// the boundary so a batch caller looping over servers has a diagnostic
    /// trail even when it chooses to continue.
    pub fn open(config: &ServerConfig) -> ConnectResult<Self> {
        let result = Self::dispatch(config);
        if let Err(err) = &result {
            if err.kind() == ErrorKind::Transport {
                warn!("connection attempt failed: {err}");
            }
        }
        result
    }

    fn dispatch(config: &ServerConfig) -> ConnectResult<Self> {
        let protocol = Protocol::from_config(config)?;
        let options = ConnectionOptions::normalize(config, protocol)?;

        match protocol {
            Protocol::Ftp { tls } => {
                let label = if tls { "ftps" } else { "ftp" };
                debug!("dispatching {label} connection to {}", options.host);
                let filesystem = FtpFilesystem::connect(&options)?;
                Ok(Connection {
                    host: options.host,
                    filesystem: Box::new(filesystem),
                    session: None,
                })
            }
            Protocol::Sftp => {
                debug!("dispatching sftp connection to {}", options.host);
                let credential =
                    resolve_credential(options.private_key.as_deref(), options.password.as_deref())?;
                let session = establish_session(&options, &credential)?;
                let filesystem = SftpFilesystem::new(&session, &options)?;
                Ok(Connection {
                    host: options.host,
                    filesystem: Box::new(filesystem),
                    session: Some(session),
                })
            }
        }
    }

    /// Host this connection was opened against, for diagnostics.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The uniform filesystem handle the deployment pipeline works with.
    pub fn filesystem(&mut self) -> &mut dyn RemoteFilesystem {
        self.filesystem.as_mut()
    }

    /// The underlying authenticated SSH session (SFTP only).
    ///
    /// The session is not thread-safe for concurrent use; callers sharing
    /// it across threads must synchronize externally.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Run a command over the authenticated SSH channel and capture its
    /// output (SFTP only).
    ///
    /// Deployment hooks use this for post-upload steps like cache clearing,
    /// reusing the session instead of opening a second one.
    pub fn exec(&self, command: &str) -> ConnectResult<String> {
        let session = self
            .session
            .as_ref()
            .ok_or(ConnectError::SftpOnly { operation: "exec" })?;

        let transport = |message: String| ConnectError::Transport {
            host: self.host.clone(),
            message,
        };

        let mut channel = session
            .channel_session()
            .map_err(|err| transport(err.to_string()))?;
        channel
            .exec(command)
            .map_err(|err| transport(err.to_string()))?;

        let mut output = String::new();
        channel
            .read_to_string(&mut output)
            .map_err(|err| transport(err.to_string()))?;
        channel.wait_close().ok();

        Ok(output)
    }
}
