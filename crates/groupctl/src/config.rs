//! CLI configuration: thin wrapper around `groupctl_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--server, --api-token, etc.).

use std::time::Duration;

use secrecy::SecretString;

use groupctl_core::{CachePolicy, ConsoleConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use groupctl_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Comma-separated profile names for error help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Build a `ConsoleConfig` from the config file, profile, and CLI overrides.
pub fn build_console_config(global: &GlobalOpts) -> Result<ConsoleConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    // If a profile exists, use it with CLI flag overrides
    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg.defaults, global);
    }
    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(&cfg),
        });
    }

    // No profile found -- try to build from CLI flags / env vars alone
    let url_str = global.server.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let url = groupctl_config::parse_server_url(url_str)?;

    let Some(ref token) = global.api_token else {
        return Err(CliError::NoCredentials {
            profile: profile_name,
        });
    };

    let mut config = ConsoleConfig::new(url, SecretString::from(token.clone()));
    config.project.clone_from(&global.project);
    if global.insecure || cfg.defaults.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    config.timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout));
    config.cache = CachePolicy {
        ttl: Duration::from_secs(cfg.defaults.cache_ttl),
        ..CachePolicy::default()
    };
    Ok(config)
}

/// Translate a `Profile` + global flags into a `ConsoleConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ConsoleConfig, CliError> {
    // 1. Server URL (flag > env > profile)
    let url_str = global.server.as_deref().unwrap_or(&profile.server);
    let url = groupctl_config::parse_server_url(url_str)?;

    // 2. API token (flag > env > profile chain)
    let token = match global.api_token {
        Some(ref token) => SecretString::from(token.clone()),
        None => groupctl_config::resolve_api_token(profile, profile_name)?,
    };

    // 3. TLS verification
    let tls = if global.insecure || profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = ConsoleConfig::new(url, token);
    // 4. Project (flag > env > profile)
    config.project = global.project.clone().or_else(|| profile.project.clone());
    config.tls = tls;
    // 5. Timeout and cache window
    config.timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(defaults.timeout),
    );
    config.cache = CachePolicy {
        ttl: Duration::from_secs(profile.cache_ttl.unwrap_or(defaults.cache_ttl)),
        ..CachePolicy::default()
    };
    Ok(config)
}
