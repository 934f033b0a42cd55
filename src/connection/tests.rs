use std::path::PathBuf;
use std::time::Duration;

use proptest::prelude::*;

use super::{MailDefaults, MailingListConfig, TlsMode, resolve_connection};

fn defaults() -> MailDefaults {
    MailDefaults {
        host: "smtp.default.test".to_string(),
        port: 587,
        username: "default-user".to_string(),
        password: "default-pass".to_string(),
        use_tls: false,
        use_ssl: false,
        timeout: Some(30),
        ssl_keyfile: None,
        ssl_certfile: None,
    }
}

#[test]
fn no_config_returns_defaults() {
    let defaults = defaults();
    let descriptor = resolve_connection(&defaults, None);
    assert_eq!(descriptor, defaults.descriptor());
    assert_eq!(descriptor.host, "smtp.default.test");
    assert_eq!(descriptor.port, 587);
    assert_eq!(descriptor.timeout, Some(Duration::from_secs(30)));
    assert_eq!(descriptor.tls_mode(), TlsMode::None);
}

#[test]
fn empty_config_matches_defaults() {
    let defaults = defaults();
    let config = MailingListConfig {
        smtp_host: Some(String::new()),
        smtp_port: Some(0),
        smtp_username: Some(String::new()),
        ..MailingListConfig::default()
    };
    assert_eq!(
        resolve_connection(&defaults, Some(&config)),
        resolve_connection(&defaults, None)
    );
}

#[test]
fn host_override_keeps_other_defaults() {
    let defaults = defaults();
    let config = MailingListConfig {
        smtp_host: Some("smtp.list.test".to_string()),
        ..MailingListConfig::default()
    };
    let descriptor = resolve_connection(&defaults, Some(&config));
    let mut expected = defaults.descriptor();
    expected.host = "smtp.list.test".to_string();
    assert_eq!(descriptor, expected);
}

#[test]
fn overrides_credentials_port_and_timeout() {
    let config = MailingListConfig {
        smtp_port: Some(2525),
        smtp_username: Some("list".to_string()),
        smtp_password: Some("secret".to_string()),
        smtp_timeout: Some(5),
        ..MailingListConfig::default()
    };
    let descriptor = resolve_connection(&defaults(), Some(&config));
    assert_eq!(descriptor.host, "smtp.default.test");
    assert_eq!(descriptor.port, 2525);
    assert_eq!(descriptor.username, "list");
    assert_eq!(descriptor.password, "secret");
    assert_eq!(descriptor.timeout, Some(Duration::from_secs(5)));
}

#[test]
fn use_tls_from_list_or_defaults() {
    let config = MailingListConfig {
        smtp_use_tls: true,
        ..MailingListConfig::default()
    };
    let descriptor = resolve_connection(&defaults(), Some(&config));
    assert_eq!(descriptor.tls_mode(), TlsMode::StartTls);

    let mut tls_defaults = defaults();
    tls_defaults.use_tls = true;
    let descriptor = resolve_connection(&tls_defaults, Some(&MailingListConfig::default()));
    assert!(descriptor.use_tls);
}

#[test]
fn implicit_tls_requires_both_files() {
    for use_tls in [false, true] {
        let config = MailingListConfig {
            smtp_use_tls: use_tls,
            smtp_use_ssl: true,
            smtp_ssl_certfile: Some(PathBuf::from("/etc/ssl/list.crt")),
            smtp_ssl_keyfile: Some(PathBuf::from("/etc/ssl/list.key")),
            ..MailingListConfig::default()
        };
        let descriptor = resolve_connection(&defaults(), Some(&config));
        assert_eq!(descriptor.tls_mode(), TlsMode::ImplicitTls);
        assert!(descriptor.use_ssl());
        assert_eq!(descriptor.use_tls, use_tls);
        assert_eq!(
            descriptor.ssl_certfile(),
            Some(&PathBuf::from("/etc/ssl/list.crt"))
        );
        assert_eq!(
            descriptor.ssl_keyfile(),
            Some(&PathBuf::from("/etc/ssl/list.key"))
        );
    }
}

#[test]
fn implicit_tls_missing_file_falls_back() {
    let only_cert = MailingListConfig {
        smtp_use_tls: true,
        smtp_use_ssl: true,
        smtp_ssl_certfile: Some(PathBuf::from("/etc/ssl/list.crt")),
        ..MailingListConfig::default()
    };
    let descriptor = resolve_connection(&defaults(), Some(&only_cert));
    assert_eq!(descriptor.tls_mode(), TlsMode::StartTls);
    assert!(!descriptor.use_ssl());
    assert_eq!(descriptor.ssl_certfile(), None);

    let only_key = MailingListConfig {
        smtp_use_ssl: true,
        smtp_ssl_keyfile: Some(PathBuf::from("/etc/ssl/list.key")),
        ..MailingListConfig::default()
    };
    let descriptor = resolve_connection(&defaults(), Some(&only_key));
    assert_eq!(descriptor.tls_mode(), TlsMode::None);
    assert_eq!(descriptor.ssl_keyfile(), None);
}

#[test]
fn empty_default_ssl_paths_never_select_implicit_tls() {
    let defaults = MailDefaults {
        use_ssl: true,
        ssl_certfile: Some(PathBuf::new()),
        ssl_keyfile: Some(PathBuf::new()),
        ..defaults()
    };
    let descriptor = resolve_connection(&defaults, None);
    assert_eq!(descriptor.tls_mode(), TlsMode::None);
    assert!(!descriptor.use_ssl());
    assert_eq!(descriptor.ssl_certfile(), None);

    let starttls = MailDefaults {
        use_tls: true,
        ssl_keyfile: Some(PathBuf::from("/etc/ssl/default.key")),
        ..defaults
    };
    let descriptor = resolve_connection(&starttls, Some(&MailingListConfig::default()));
    assert_eq!(descriptor.tls_mode(), TlsMode::StartTls);
}

#[test]
fn debug_masks_password() {
    let descriptor = resolve_connection(&defaults(), None);
    let rendered = format!("{descriptor:?}");
    assert!(!rendered.contains("default-pass"));
    assert!(rendered.contains("***"));
}

fn empty_string() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), Just(Some(String::new()))]
}

prop_compose! {
    fn arb_defaults()(
        host in "[a-z]{1,12}(\\.[a-z]{2,6})?",
        port in any::<u16>(),
        username in "[a-z]{0,8}",
        password in "[a-zA-Z0-9]{0,12}",
        use_tls in any::<bool>(),
        timeout in proptest::option::of(0u64..600),
    ) -> MailDefaults {
        MailDefaults {
            host,
            port,
            username,
            password,
            use_tls,
            timeout,
            ..MailDefaults::default()
        }
    }
}

prop_compose! {
    fn arb_empty_config()(
        smtp_host in empty_string(),
        smtp_username in empty_string(),
        smtp_password in empty_string(),
        smtp_port in prop_oneof![Just(None), Just(Some(0u16))],
        smtp_timeout in prop_oneof![Just(None), Just(Some(0u64))],
    ) -> MailingListConfig {
        MailingListConfig {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            smtp_timeout,
            ..MailingListConfig::default()
        }
    }
}

proptest! {
    #[test]
    fn unset_overrides_never_change_the_defaults(
        defaults in arb_defaults(),
        config in arb_empty_config(),
    ) {
        prop_assert_eq!(
            resolve_connection(&defaults, Some(&config)),
            resolve_connection(&defaults, None)
        );
    }
}
