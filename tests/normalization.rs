//! Scenario tests for options normalization through the public API.

use std::path::PathBuf;
use std::time::Duration;

use gangway::{Credential, ConnectionOptions, PrivateKey, Protocol, ServerConfig};

#[test]
fn ftp_scenario_applies_all_defaults() {
    // {scheme: ftp, host: h, user: u, pass: p, path: /www, port: unset}
    let config = ServerConfig {
        scheme: Some("ftp".to_string()),
        host: Some("h".to_string()),
        user: Some("u".to_string()),
        pass: Some("p".to_string()),
        path: Some("/www".to_string()),
        ..ServerConfig::default()
    };

    let protocol = Protocol::from_config(&config).unwrap();
    let options = ConnectionOptions::normalize(&config, protocol).unwrap();

    assert!(options.passive);
    assert!(!options.tls);
    assert_eq!(options.port, 21);
    assert_eq!(options.timeout, Duration::from_secs(30));
    assert_eq!(options.root, PathBuf::from("/www"));
    assert_eq!(options.username, "u");
    assert_eq!(options.password.as_deref(), Some("p"));
}

#[test]
fn octal_permission_strings_reach_the_transport_as_numbers() {
    let config = ServerConfig {
        scheme: Some("sftp".to_string()),
        host: Some("h".to_string()),
        user: Some("u".to_string()),
        pass: Some("p".to_string()),
        path: Some("/www".to_string()),
        perm_public: Some("0644".to_string()),
        directory_perm: Some("0755".to_string()),
        ..ServerConfig::default()
    };

    let options = ConnectionOptions::normalize(&config, Protocol::Sftp).unwrap();
    assert_eq!(options.perm_public, Some(420));
    assert_eq!(options.directory_perm, Some(493));
}

#[test]
fn key_and_password_together_demote_password_to_passphrase() {
    let key_file = tempfile::NamedTempFile::new().unwrap();

    let credential = gangway::resolve_credential(
        Some(key_file.path().to_str().unwrap()),
        Some("also-a-passphrase"),
    )
    .unwrap();

    match credential {
        Credential::Key { key, passphrase } => {
            assert_eq!(key, PrivateKey::File(key_file.path().to_path_buf()));
            // The password never travels as an independent credential.
            assert_eq!(passphrase.as_deref(), Some("also-a-passphrase"));
        }
        Credential::Password(_) => {
            panic!("password must not be selected when a key is resolved")
        }
    }
}

#[test]
fn normalization_is_independent_across_calls() {
    let config = ServerConfig {
        scheme: Some("ftp".to_string()),
        host: Some("h".to_string()),
        user: Some("u".to_string()),
        pass: Some("p".to_string()),
        path: Some("/www".to_string()),
        permissions: Some("0644".to_string()),
        visibility: Some("public".to_string()),
        ..ServerConfig::default()
    };

    let first = ConnectionOptions::normalize(&config, Protocol::Ftp { tls: false }).unwrap();
    let second = ConnectionOptions::normalize(&config, Protocol::Ftp { tls: false }).unwrap();

    // The merge writes into the derived options, never back into the input,
    // so repeated normalization sees identical state.
    assert_eq!(first, second);
    assert_eq!(config.perm_public, None);
    assert_eq!(first.perm_public, Some(0o644));
}
