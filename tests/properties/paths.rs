//! Property tests for key-path tilde expansion.

use proptest::prelude::*;

use gangway::expand_home;

fn non_tilde_path_string() -> impl Strategy<Value = String> {
    // Small strings, unlikely to hit OS-specific path corner cases.
    proptest::string::string_regex("[A-Za-z0-9./_-]{0,64}")
        .unwrap()
        .prop_filter("must not start with ~", |s| !s.starts_with('~'))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: `expand_home` is identity for paths that don't start
    /// with `~`.
    #[test]
    fn property_expand_home_non_tilde_is_identity(path in non_tilde_path_string()) {
        let p = std::path::PathBuf::from(&path);
        prop_assert_eq!(expand_home(&p), p);
    }

    /// PROPERTY: `expand_home("~/...")` expands to `home_dir()/...` when a
    /// home directory is known, and is a no-op otherwise.
    #[test]
    fn property_tilde_expansion_uses_home(
        suffix in proptest::string::string_regex("[A-Za-z0-9._-]{1,16}(/[A-Za-z0-9._-]{1,16}){0,3}").unwrap()
    ) {
        let tilde_path = format!("~/{suffix}");
        let expanded = expand_home(std::path::Path::new(&tilde_path));

        if let Some(home) = gangway::auth::home_dir() {
            prop_assert_eq!(expanded, home.join(&suffix));
        } else {
            prop_assert_eq!(expanded, std::path::PathBuf::from(&tilde_path));
        }
    }
}
