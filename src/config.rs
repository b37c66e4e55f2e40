//! Server configuration input
//!
//! A [`ServerConfig`] is the loosely-typed bag a deployment target is
//! declared with. Every field is optional at this level; validation and
//! defaulting happen later, at the normalization boundary in
//! [`crate::options`] and in the connection builder.
//!
//! Deployment files name their targets in a `[servers.<name>]` table:
//!
//! ```toml
//! [servers.production]
//! scheme = "sftp"
//! host = "deploy.example.com"
//! user = "deploy"
//! privkey = "~/.ssh/id_deploy"
//! path = "/var/www"
//!
//! [servers.staging]
//! scheme = "ftp"
//! host = "staging.example.com"
//! user = "deploy"
//! pass = "hunter2"
//! path = "/www"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConnectResult;

/// Declarative description of one remote deployment target.
///
/// Field names mirror the deployment file keys; the `camelCase` aliases keep
/// configurations written for the original tool working unchanged. Unknown
/// keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Wire protocol: `ftp`, `ftps` or `sftp`
    pub scheme: Option<String>,
    /// Remote host name or address
    pub host: Option<String>,
    /// Login user name
    pub user: Option<String>,
    /// Login password (used as key passphrase when `privkey` is set)
    pub pass: Option<String>,
    /// Remote root path deployments are relative to
    pub path: Option<String>,
    /// Explicit port; defaults to 21 (ftp/ftps) or 22 (sftp)
    pub port: Option<u16>,
    /// Connection timeout in seconds; defaults to 30
    pub timeout: Option<u64>,
    /// FTP passive mode; defaults to true
    pub passive: Option<bool>,
    /// Explicit TLS for plain `ftp` scheme; defaults to false
    pub ssl: Option<bool>,
    /// SFTP private key: a path (tilde-expandable) or inline PEM text
    pub privkey: Option<String>,
    /// Generic permission value, routed by `visibility`
    pub permissions: Option<String>,
    /// Which slot `permissions` fills: `public` or `private`
    pub visibility: Option<String>,
    /// File permission bits for private files, octal string (e.g. `"0600"`)
    #[serde(alias = "permPrivate")]
    pub perm_private: Option<String>,
    /// File permission bits for public files, octal string (e.g. `"0644"`)
    #[serde(alias = "permPublic")]
    pub perm_public: Option<String>,
    /// Directory permission bits, octal string (e.g. `"0755"`)
    #[serde(alias = "directoryPerm")]
    pub directory_perm: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DeployFile {
    #[serde(default)]
    servers: BTreeMap<String, ServerConfig>,
}

/// Parse a deployment document and return its server table, keyed by name.
pub fn load_servers(text: &str) -> ConnectResult<BTreeMap<String, ServerConfig>> {
    let file: DeployFile = toml::from_str(text)?;
    Ok(file.servers)
}

/// Read and parse a deployment file from disk.
pub fn load_servers_from_path(path: &Path) -> ConnectResult<BTreeMap<String, ServerConfig>> {
    let text = std::fs::read_to_string(path)?;
    load_servers(&text)
}
