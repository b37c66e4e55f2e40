//! Options normalization
//!
//! Converts the loosely-typed [`ServerConfig`] bag into an immutable,
//! protocol-aware [`ConnectionOptions`] value. This is the one place where
//! defaults are applied and permission strings are coerced to numbers; the
//! input record is never mutated.
//!
//! Normalization is pure: no network, no filesystem. Private-key resolution
//! (which touches the filesystem) happens later, in [`crate::auth`].

use std::path::PathBuf;
use std::time::Duration;

use log::debug;

use crate::config::ServerConfig;
use crate::error::{ConnectError, ConnectResult};

/// Fallback connection timeout when the configuration has none (or zero).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Closed set of supported wire protocols.
///
/// Adding a protocol means adding a variant here plus one constructor path
/// in the connection builder; existing variants never widen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// FTP, optionally upgraded to explicit TLS (FTPS)
    Ftp { tls: bool },
    /// SFTP over SSH
    Sftp,
}

impl Protocol {
    /// Select the protocol from a configuration's `scheme` (and, for plain
    /// `ftp`, its `ssl` flag).
    ///
    /// A missing scheme and an unrecognized scheme are distinct
    /// configuration errors so the caller can tell a typo from an omission.
    pub fn from_config(config: &ServerConfig) -> ConnectResult<Self> {
        match config.scheme.as_deref() {
            None | Some("") => Err(ConnectError::MissingScheme),
            Some("ftp") => Ok(Protocol::Ftp {
                tls: config.ssl.unwrap_or(false),
            }),
            Some("ftps") => Ok(Protocol::Ftp { tls: true }),
            Some("sftp") => Ok(Protocol::Sftp),
            Some(other) => Err(ConnectError::UnknownScheme {
                scheme: other.to_string(),
            }),
        }
    }

    /// Well-known port used when the configuration does not name one.
    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Ftp { .. } => 21,
            Protocol::Sftp => 22,
        }
    }
}

/// Typed connection options, immutable once built.
///
/// Permission slots stay `None` when the configuration leaves them out;
/// defaults for unset permissions are the transport's business, not ours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub host: String,
    pub username: String,
    pub password: Option<String>,
    /// Remote root all deployment paths are relative to
    pub root: PathBuf,
    pub timeout: Duration,
    pub port: u16,
    /// FTP only; ignored for SFTP
    pub passive: bool,
    /// FTP only; explicit TLS upgrade before login
    pub tls: bool,
    /// SFTP only; raw key value (path or inline PEM), not yet resolved
    pub private_key: Option<String>,
    /// File permission bits for private files
    pub perm_private: Option<u32>,
    /// File permission bits for public files
    pub perm_public: Option<u32>,
    /// Directory permission bits
    pub directory_perm: Option<u32>,
}

impl ConnectionOptions {
    /// Normalize a server configuration for the given protocol.
    ///
    /// `host`, `user` and `path` must be present; everything else is
    /// defaulted or left unset. A configured timeout of zero falls back to
    /// [`DEFAULT_TIMEOUT_SECS`], matching the behavior batch callers rely on
    /// when a generated configuration zeroes the field out.
    pub fn normalize(config: &ServerConfig, protocol: Protocol) -> ConnectResult<Self> {
        let host = require(&config.host, "host")?;
        let username = require(&config.user, "user")?;
        let root = PathBuf::from(require(&config.path, "path")?);

        let timeout = config
            .timeout
            .filter(|&secs| secs != 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let (perm_private, perm_public) = file_permissions(config);

        Ok(ConnectionOptions {
            host,
            username,
            password: config.pass.clone().filter(|p| !p.is_empty()),
            root,
            timeout: Duration::from_secs(timeout),
            port: config.port.unwrap_or_else(|| protocol.default_port()),
            passive: config.passive.unwrap_or(true),
            tls: matches!(protocol, Protocol::Ftp { tls: true }),
            private_key: config.privkey.clone().filter(|k| !k.is_empty()),
            perm_private,
            perm_public,
            directory_perm: config.directory_perm.as_deref().and_then(parse_permission),
        })
    }
}

fn require(field: &Option<String>, name: &'static str) -> ConnectResult<String> {
    match field.as_deref() {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ConnectError::MissingField { field: name }),
    }
}

/// Resolve the two file-permission slots, merging the generic
/// `permissions`/`visibility` pair into whichever slot it names.
///
/// An explicit `perm_private`/`perm_public` value wins over the merge, so a
/// configuration that sets both is not silently overridden by the generic
/// field.
fn file_permissions(config: &ServerConfig) -> (Option<u32>, Option<u32>) {
    let mut private = config.perm_private.as_deref().and_then(parse_permission);
    let mut public = config.perm_public.as_deref().and_then(parse_permission);

    if let (Some(permissions), Some(visibility)) =
        (config.permissions.as_deref(), config.visibility.as_deref())
    {
        match visibility {
            "private" if private.is_none() => private = parse_permission(permissions),
            "public" if public.is_none() => public = parse_permission(permissions),
            "private" | "public" => {}
            other => debug!("ignoring permissions for unknown visibility '{other}'"),
        }
    }

    (private, public)
}

/// Parse a permission string with base detection: a leading `0` (or `0o`)
/// means octal, `0x` means hexadecimal, anything else decimal.
///
/// Returns `None` for empty or unparseable values; a garbage permission
/// string must not silently become mode 0.
pub(crate) fn parse_permission(value: &str) -> Option<u32> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (digits, radix) = if let Some(rest) = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        (rest, 16)
    } else if let Some(rest) = value
        .strip_prefix("0o")
        .or_else(|| value.strip_prefix("0O"))
    {
        (rest, 8)
    } else if value.len() > 1 && value.starts_with('0') {
        (&value[1..], 8)
    } else {
        (value, 10)
    };

    match u32::from_str_radix(digits, radix) {
        Ok(bits) => Some(bits),
        Err(_) => {
            debug!("ignoring unparseable permission value '{value}'");
            None
        }
    }
}
