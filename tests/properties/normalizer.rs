//! Property tests for options normalization and permission coercion.

use proptest::prelude::*;

use gangway::{ConnectionOptions, Protocol, ServerConfig};

fn loose_config() -> impl Strategy<Value = ServerConfig> {
    let field = proptest::option::of("[ -~]{0,24}");
    (
        field.clone(),
        field.clone(),
        field.clone(),
        field,
        proptest::option::of(0u64..=86_400),
    )
        .prop_map(|(permissions, visibility, perm_public, directory_perm, timeout)| {
            ServerConfig {
                scheme: Some("ftp".to_string()),
                host: Some("h".to_string()),
                user: Some("u".to_string()),
                pass: Some("p".to_string()),
                path: Some("/www".to_string()),
                timeout,
                permissions,
                visibility,
                perm_public,
                directory_perm,
                ..ServerConfig::default()
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Normalization never panics, whatever garbage sits in the
    /// optional permission and timeout fields.
    #[test]
    fn property_normalize_never_panics(config in loose_config()) {
        let _ = ConnectionOptions::normalize(&config, Protocol::Ftp { tls: false });
    }

    /// PROPERTY: The derived timeout is never zero; an absent or zero
    /// configured timeout becomes the 30-second default.
    #[test]
    fn property_timeout_is_never_zero(config in loose_config()) {
        let options = ConnectionOptions::normalize(&config, Protocol::Ftp { tls: false }).unwrap();
        prop_assert!(!options.timeout.is_zero());
        if config.timeout.unwrap_or(0) == 0 {
            prop_assert_eq!(options.timeout.as_secs(), 30);
        }
    }

    /// PROPERTY: A zero-left-padded octal string is coerced to the value of
    /// its digits read base-8.
    #[test]
    fn property_leading_zero_strings_parse_as_octal(bits in 0u32..=0o777) {
        let config = ServerConfig {
            scheme: Some("ftp".to_string()),
            host: Some("h".to_string()),
            user: Some("u".to_string()),
            pass: Some("p".to_string()),
            path: Some("/www".to_string()),
            perm_public: Some(format!("0{bits:o}")),
            ..ServerConfig::default()
        };
        let options = ConnectionOptions::normalize(&config, Protocol::Ftp { tls: false }).unwrap();
        prop_assert_eq!(options.perm_public, Some(bits));
    }

    /// PROPERTY: Normalization is deterministic and leaves the input
    /// unchanged, so two calls on one config always agree.
    #[test]
    fn property_normalize_is_pure(config in loose_config()) {
        let first = ConnectionOptions::normalize(&config, Protocol::Ftp { tls: false }).unwrap();
        let second = ConnectionOptions::normalize(&config, Protocol::Ftp { tls: false }).unwrap();
        prop_assert_eq!(first, second);
    }
}
