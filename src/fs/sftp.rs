//! SFTP filesystem adapter
//!
//! Session establishment (TCP dial, SSH handshake, authentication) lives
//! here alongside the [`RemoteFilesystem`] wrapper over the SFTP channel.
//! The authenticated [`Session`] is returned separately so the connection
//! builder can keep it as the reusable connection provider.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};

use log::debug;
use ssh2::{FileStat, Session, Sftp};

use crate::auth::{Credential, PrivateKey};
use crate::error::{ConnectError, ConnectResult};
use crate::fs::{
    join_root, resolve_addr, FilePermissions, FsError, FsResult, RemoteEntry, RemoteFilesystem,
    Visibility,
};
use crate::options::ConnectionOptions;

/// SFTP status code for "no such file" (SSH_FX_NO_SUCH_FILE).
const SFTP_NO_SUCH_FILE: i32 = 2;

/// Directory mode handed to the server when the configuration sets none;
/// the server's umask still applies.
const DEFAULT_DIR_MODE: i32 = 0o755;

/// Open a TCP connection, perform the SSH handshake and authenticate.
///
/// Exactly one authentication method is attempted, as selected by
/// [`crate::auth::resolve_credential`]: a key (file or inline, with the
/// password acting as passphrase) or a password. Never both.
pub(crate) fn establish_session(
    options: &ConnectionOptions,
    credential: &Credential,
) -> ConnectResult<Session> {
    let addr = resolve_addr(&options.host, options.port)?;
    debug!("opening sftp session to {addr} as {}", options.username);

    let transport = |message: String| ConnectError::Transport {
        host: options.host.clone(),
        message,
    };

    let tcp = TcpStream::connect_timeout(&addr, options.timeout)
        .map_err(|err| transport(err.to_string()))?;
    tcp.set_read_timeout(Some(options.timeout)).ok();
    tcp.set_write_timeout(Some(options.timeout)).ok();

    let mut session = Session::new().map_err(|err| transport(err.to_string()))?;
    session.set_tcp_stream(tcp);
    session.set_timeout(timeout_ms(options.timeout));
    session.handshake().map_err(|err| transport(err.to_string()))?;

    let user = &options.username;
    match credential {
        Credential::Key { key, passphrase } => match key {
            PrivateKey::File(path) => session
                .userauth_pubkey_file(user, None, path, passphrase.as_deref())
                .map_err(|err| transport(err.to_string()))?,
            PrivateKey::Inline(pem) => session
                .userauth_pubkey_memory(user, None, pem, passphrase.as_deref())
                .map_err(|err| transport(err.to_string()))?,
        },
        Credential::Password(password) => session
            .userauth_password(user, password)
            .map_err(|err| transport(err.to_string()))?,
    }

    if !session.authenticated() {
        return Err(transport("authentication failed".to_string()));
    }

    Ok(session)
}

/// Session timeout in milliseconds, saturating at `u32::MAX` for timeouts
/// libssh2 cannot represent.
fn timeout_ms(timeout: std::time::Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

/// Remote filesystem over an authenticated SFTP channel.
pub struct SftpFilesystem {
    sftp: Sftp,
    root: PathBuf,
    permissions: FilePermissions,
}

impl SftpFilesystem {
    /// Open the SFTP channel on an authenticated session, rooted at the
    /// configured remote path.
    pub fn new(session: &Session, options: &ConnectionOptions) -> ConnectResult<Self> {
        let sftp = session.sftp().map_err(|err| ConnectError::Transport {
            host: options.host.clone(),
            message: err.to_string(),
        })?;

        Ok(SftpFilesystem {
            sftp,
            root: options.root.clone(),
            permissions: FilePermissions::from_options(options),
        })
    }

    fn full(&self, path: &Path) -> PathBuf {
        join_root(&self.root, path)
    }

    fn chmod(&self, remote: &Path, mode: u32, op: &'static str) -> FsResult<()> {
        let stat = FileStat {
            size: None,
            uid: None,
            gid: None,
            perm: Some(mode),
            atime: None,
            mtime: None,
        };
        self.sftp
            .setstat(remote, stat)
            .map_err(|err| sftp_error(op, remote, err))
    }
}

impl RemoteFilesystem for SftpFilesystem {
    fn read(&mut self, path: &Path) -> FsResult<Vec<u8>> {
        let remote = self.full(path);
        let mut file = self
            .sftp
            .open(&remote)
            .map_err(|err| sftp_error("read", &remote, err))?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    fn write_with_visibility(
        &mut self,
        path: &Path,
        content: &[u8],
        visibility: Visibility,
    ) -> FsResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }

        let remote = self.full(path);
        let mut file = self
            .sftp
            .create(&remote)
            .map_err(|err| sftp_error("write", &remote, err))?;
        file.write_all(content)?;
        drop(file);

        if let Some(mode) = self.permissions.file_mode(visibility) {
            self.chmod(&remote, mode, "write")?;
        }
        Ok(())
    }

    fn delete(&mut self, path: &Path) -> FsResult<()> {
        let remote = self.full(path);
        self.sftp
            .unlink(&remote)
            .map_err(|err| sftp_error("delete", &remote, err))
    }

    fn list(&mut self, path: &Path) -> FsResult<Vec<RemoteEntry>> {
        let remote = self.full(path);
        let entries = self
            .sftp
            .readdir(&remote)
            .map_err(|err| sftp_error("list", &remote, err))?;

        Ok(entries
            .into_iter()
            .map(|(entry_path, stat)| RemoteEntry {
                name: entry_path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                is_dir: stat.is_dir(),
                size: stat.size.unwrap_or(0),
            })
            .collect())
    }

    fn exists(&mut self, path: &Path) -> bool {
        let remote = self.full(path);
        self.sftp.stat(&remote).is_ok()
    }

    fn create_dir_all(&mut self, path: &Path) -> FsResult<()> {
        let full = self.full(path);
        let mode = self
            .permissions
            .directory
            .map(|m| m as i32)
            .unwrap_or(DEFAULT_DIR_MODE);
        let mut current = PathBuf::new();

        for component in full.components() {
            current.push(component);
            if current.as_os_str().is_empty() || current == Path::new("/") {
                continue;
            }
            if self.sftp.stat(&current).is_ok() {
                continue;
            }
            self.sftp
                .mkdir(&current, mode)
                .map_err(|err| sftp_error("create_dir_all", &current, err))?;
        }
        Ok(())
    }

    fn set_permissions(&mut self, path: &Path, mode: u32) -> FsResult<()> {
        let remote = self.full(path);
        self.chmod(&remote, mode, "set_permissions")
    }
}

fn sftp_error(op: &'static str, path: &Path, err: ssh2::Error) -> FsError {
    if err.code() == ssh2::ErrorCode::SFTP(SFTP_NO_SUCH_FILE) {
        return FsError::NotFound(path.to_path_buf());
    }
    FsError::Operation {
        op,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Handshake and channel behavior need a live SSH endpoint; covered by
    // the deployment tool's end-to-end suite. The error mapping is pure.

    #[test]
    fn no_such_file_maps_to_not_found() {
        let err = ssh2::Error::new(
            ssh2::ErrorCode::SFTP(SFTP_NO_SUCH_FILE),
            "no such file",
        );
        match sftp_error("read", Path::new("/www/missing"), err) {
            FsError::NotFound(path) => assert_eq!(path, PathBuf::from("/www/missing")),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn timeout_conversion_saturates_instead_of_truncating() {
        use std::time::Duration;

        assert_eq!(timeout_ms(Duration::from_secs(30)), 30_000);
        assert_eq!(timeout_ms(Duration::ZERO), 0);
        // Beyond what fits in u32 milliseconds (~49.7 days) the session
        // timeout pins to the maximum rather than wrapping around.
        assert_eq!(timeout_ms(Duration::from_secs(60 * 60 * 24 * 365)), u32::MAX);
        assert_eq!(
            timeout_ms(Duration::from_millis(u64::from(u32::MAX)) + Duration::from_millis(1)),
            u32::MAX
        );
    }

    #[test]
    fn other_codes_map_to_operation_error() {
        let err = ssh2::Error::new(ssh2::ErrorCode::SFTP(3), "permission denied");
        match sftp_error("write", Path::new("/www/f"), err) {
            FsError::Operation { op, message } => {
                assert_eq!(op, "write");
                assert!(message.contains("permission denied"));
            }
            other => panic!("expected Operation, got {other:?}"),
        }
    }
}
