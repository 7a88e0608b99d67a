#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;

use groupctl_config::{
    Config, ConfigError, Defaults, Profile, load_config_from, profile_to_console_config,
    resolve_api_token, save_config_to,
};
use groupctl_core::TlsVerification;

const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
output = "json"
timeout = 10

[profiles.lab]
server = "https://monitor.lab.example.com"
project = "network"
api_token = "lab-token"
cache_ttl = 60

[profiles.prod]
server = "https://monitor.example.com"
api_token_env = "GROUPCTL_TEST_TOKEN_THAT_IS_NEVER_SET"
api_token = "fallback"
ca_cert = "/etc/ssl/monitor-ca.pem"
"#;

fn profile(server: &str) -> Profile {
    Profile {
        server: server.into(),
        api_token: Some("secret".into()),
        ..Profile::default()
    }
}

#[test]
fn loads_profiles_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE).unwrap();

    let cfg = load_config_from(&path).unwrap();

    assert_eq!(cfg.active_profile_name(None), "lab");
    assert_eq!(cfg.active_profile_name(Some("prod")), "prod");
    assert_eq!(cfg.defaults.output, "json");
    assert_eq!(cfg.defaults.timeout, 10);
    assert_eq!(cfg.defaults.cache_ttl, 300);

    let lab = cfg.profile("lab").unwrap();
    assert_eq!(lab.project.as_deref(), Some("network"));
    assert_eq!(lab.cache_ttl, Some(60));
    assert!(matches!(
        cfg.profile("staging"),
        Err(ConfigError::UnknownProfile { .. })
    ));
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(cfg.default_profile.as_deref(), Some("default"));
    assert_eq!(cfg.defaults, Defaults::default());
    assert!(cfg.profiles.is_empty());
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let mut cfg = Config::default();
    cfg.profiles
        .insert("default".into(), profile("https://monitor.example.com"));

    save_config_to(&cfg, &path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[profiles.default]"));
    assert!(!written.contains("api_token_env"));

    assert_eq!(load_config_from(&path).unwrap(), cfg);
}

#[test]
fn unset_env_var_falls_back_to_plaintext_token() {
    let profile = Profile {
        api_token_env: Some("GROUPCTL_TEST_TOKEN_THAT_IS_NEVER_SET".into()),
        ..profile("https://monitor.example.com")
    };

    let token = resolve_api_token(&profile, "groupctl-test-profile-without-keyring").unwrap();

    assert_eq!(token.expose_secret(), "secret");
}

#[test]
fn profile_without_token_is_rejected() {
    let profile = Profile {
        server: "https://monitor.example.com".into(),
        ..Profile::default()
    };

    let err = resolve_api_token(&profile, "groupctl-test-profile-without-keyring").unwrap_err();

    assert!(matches!(err, ConfigError::NoCredentials { .. }));
}

#[test]
fn console_config_carries_profile_settings() {
    let mut profile = profile("https://monitor.example.com");
    profile.project = Some("network".into());
    profile.ca_cert = Some(PathBuf::from("/etc/ssl/ca.pem"));
    profile.cache_ttl = Some(45);

    let config = profile_to_console_config(
        &profile,
        "groupctl-test-profile-without-keyring",
        &Defaults::default(),
    )
    .unwrap();

    assert_eq!(config.url.as_str(), "https://monitor.example.com/");
    assert_eq!(config.project.as_deref(), Some("network"));
    assert_eq!(config.tls, TlsVerification::CustomCa(PathBuf::from("/etc/ssl/ca.pem")));
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.cache.ttl, Duration::from_secs(45));
    assert!(!config.cache.refetch_on_focus);
}

#[test]
fn insecure_overrides_custom_ca() {
    let mut profile = profile("https://monitor.example.com");
    profile.ca_cert = Some(PathBuf::from("/etc/ssl/ca.pem"));
    let defaults = Defaults {
        insecure: true,
        ..Defaults::default()
    };

    let config =
        profile_to_console_config(&profile, "groupctl-test-profile-without-keyring", &defaults)
            .unwrap();

    assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
}

#[test]
fn malformed_server_url_is_a_validation_error() {
    let err = profile_to_console_config(
        &profile("not a url"),
        "groupctl-test-profile-without-keyring",
        &Defaults::default(),
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "server"));
}
