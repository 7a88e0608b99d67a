// ── Runtime console configuration ──
//
// Describes *how* to reach the group service. Carries credentials and
// tuning but never touches disk; groupctl-config builds a `ConsoleConfig`
// and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// How to authenticate with the group service.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Bearer API token.
    ApiToken(SecretString),
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Read-through cache tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// How long a fetched list is served without going back to the network.
    pub ttl: Duration,
    /// Refetch when the operator returns to the console. Off by default.
    pub refetch_on_focus: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            refetch_on_focus: false,
        }
    }
}

/// Configuration for one console session against one server.
///
/// Built by the CLI, passed to `Console` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Server URL (e.g., `https://monitor.example.com`).
    pub url: Url,
    /// Authentication credentials.
    pub auth: AuthCredentials,
    /// Initial project; `None` leaves the console without context.
    pub project: Option<String>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    pub cache: CachePolicy,
}

impl ConsoleConfig {
    pub fn new(url: Url, token: SecretString) -> Self {
        Self {
            url,
            auth: AuthCredentials::ApiToken(token),
            project: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            cache: CachePolicy::default(),
        }
    }

    /// Transport settings for `groupctl_api`.
    pub(crate) fn transport(&self) -> groupctl_api::TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => groupctl_api::TlsMode::System,
            TlsVerification::CustomCa(path) => groupctl_api::TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => groupctl_api::TlsMode::DangerAcceptInvalid,
        };
        groupctl_api::TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
