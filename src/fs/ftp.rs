//! FTP/FTPS filesystem adapter
//!
//! Wraps a suppaftp control connection in the [`RemoteFilesystem`]
//! capability. The FTPS variant upgrades to explicit TLS before login, per
//! suppaftp's recommended sequence, so credentials never cross the wire in
//! the clear.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use log::debug;
use suppaftp::native_tls::TlsConnector;
use suppaftp::types::FileType;
use suppaftp::{FtpError, Mode, NativeTlsConnector, NativeTlsFtpStream as FtpStream};

use crate::error::{ConnectError, ConnectResult};
use crate::fs::{
    join_root, resolve_addr, FilePermissions, FsError, FsResult, RemoteEntry, RemoteFilesystem,
    Visibility,
};
use crate::options::ConnectionOptions;

/// Remote filesystem over an FTP or FTPS session.
pub struct FtpFilesystem {
    stream: FtpStream,
    root: PathBuf,
    permissions: FilePermissions,
}

impl FtpFilesystem {
    /// Establish an FTP session from normalized options.
    ///
    /// Sequence: dial with the configured timeout, optionally upgrade to
    /// TLS, select transfer mode, log in, switch to binary transfers.
    pub fn connect(options: &ConnectionOptions) -> ConnectResult<Self> {
        let password = options
            .password
            .as_deref()
            .ok_or(ConnectError::MissingField { field: "pass" })?;

        let addr = resolve_addr(&options.host, options.port)?;
        debug!(
            "opening {} session to {addr} (passive: {})",
            if options.tls { "ftps" } else { "ftp" },
            options.passive
        );

        let stream = FtpStream::connect_timeout(addr, options.timeout)
            .map_err(|err| transport_error(&options.host, err))?;

        let mut stream = if options.tls {
            let tls = TlsConnector::new().map_err(|err| ConnectError::Transport {
                host: options.host.clone(),
                message: format!("TLS initialization failed: {err}"),
            })?;
            stream
                .into_secure(NativeTlsConnector::from(tls), &options.host)
                .map_err(|err| transport_error(&options.host, err))?
        } else {
            stream
        };

        stream.set_mode(if options.passive {
            Mode::Passive
        } else {
            Mode::Active
        });

        stream
            .login(options.username.as_str(), password)
            .map_err(|err| transport_error(&options.host, err))?;
        stream
            .transfer_type(FileType::Binary)
            .map_err(|err| transport_error(&options.host, err))?;

        Ok(FtpFilesystem {
            stream,
            root: options.root.clone(),
            permissions: FilePermissions::from_options(options),
        })
    }

    fn full(&self, path: &Path) -> String {
        join_root(&self.root, path).to_string_lossy().into_owned()
    }

    fn chmod(&mut self, remote: &str, mode: u32, op: &'static str) -> FsResult<()> {
        self.stream
            .site(format!("CHMOD {:o} {}", mode, remote))
            .map_err(|err| operation_error(op, err))?;
        Ok(())
    }
}

impl RemoteFilesystem for FtpFilesystem {
    fn read(&mut self, path: &Path) -> FsResult<Vec<u8>> {
        let remote = self.full(path);
        let buffer = self
            .stream
            .retr_as_buffer(&remote)
            .map_err(|err| operation_error("read", err))?;
        Ok(buffer.into_inner())
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
        self.stream
            .put_file(&remote, &mut Cursor::new(content))
            .map_err(|err| operation_error("write", err))?;

        if let Some(mode) = self.permissions.file_mode(visibility) {
            self.chmod(&remote, mode, "write")?;
        }
        Ok(())
    }

    fn delete(&mut self, path: &Path) -> FsResult<()> {
        let remote = self.full(path);
        self.stream
            .rm(&remote)
            .map_err(|err| operation_error("delete", err))
    }

    fn list(&mut self, path: &Path) -> FsResult<Vec<RemoteEntry>> {
        let remote = self.full(path);
        let lines = self
            .stream
            .list(Some(&remote))
            .map_err(|err| operation_error("list", err))?;

        // Lines a server emits in a nonstandard format are skipped rather
        // than failing the whole listing.
        Ok(lines
            .iter()
            .filter_map(|line| line.parse::<suppaftp::list::File>().ok())
            .map(|file| RemoteEntry {
                name: file.name().to_string(),
                is_dir: file.is_directory(),
                size: file.size() as u64,
            })
            .collect())
    }

    fn exists(&mut self, path: &Path) -> bool {
        let remote = self.full(path);
        if self.stream.size(&remote).is_ok() {
            return true;
        }
        // SIZE fails for directories; fall back to a name listing.
        self.stream
            .nlst(Some(&remote))
            .map(|entries| !entries.is_empty())
            .unwrap_or(false)
    }

    fn create_dir_all(&mut self, path: &Path) -> FsResult<()> {
        let full = join_root(&self.root, path);
        let mut current = PathBuf::new();

        for component in full.components() {
            current.push(component);
            let remote = current.to_string_lossy().into_owned();
            if remote == "/" || remote.is_empty() {
                continue;
            }
            // MKD on an existing directory answers 550; only chmod the ones
            // we actually created.
            if self.stream.mkdir(&remote).is_ok() {
                if let Some(mode) = self.permissions.directory {
                    self.chmod(&remote, mode, "create_dir_all")?;
                }
            }
        }
        Ok(())
    }

    fn set_permissions(&mut self, path: &Path, mode: u32) -> FsResult<()> {
        let remote = self.full(path);
        self.chmod(&remote, mode, "set_permissions")
    }
}

impl Drop for FtpFilesystem {
    fn drop(&mut self) {
        let _ = self.stream.quit();
    }
}

fn transport_error(host: &str, err: FtpError) -> ConnectError {
    ConnectError::Transport {
        host: host.to_string(),
        message: err.to_string(),
    }
}

fn operation_error(op: &'static str, err: FtpError) -> FsError {
    FsError::Operation {
        op,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Session-level behavior needs a live FTP server and is covered by the
    // deployment tool's end-to-end suite; these tests cover the pure parts.

    #[test]
    fn full_path_joins_root() {
        let root = PathBuf::from("/www");
        assert_eq!(
            join_root(&root, Path::new("index.html")),
            PathBuf::from("/www/index.html")
        );
    }

    #[test]
    fn operation_error_carries_op_name() {
        let err = operation_error("write", FtpError::BadResponse);
        assert!(err.to_string().contains("write"));
    }
}
