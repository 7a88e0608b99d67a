// ── Core error types ──
//
// User-facing errors from groupctl-core. Consumers never see reqwest or
// JSON parse failures directly; `From<groupctl_api::Error>` folds every
// transport-layer failure into `Remote` (or `Internal` for payloads the
// core cannot interpret).
//
// `CoreError` is `Clone` so one failed read can be handed to every waiter
// of a shared in-flight request.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Local errors (never sent) ────────────────────────────────────
    /// Input rejected before any network call.
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    /// No server/project is selected, so no repository call is issued.
    #[error("No project selected")]
    NoContext,

    /// Another bulk action or propagation is already in flight on this view.
    #[error("Another bulk action is already in progress")]
    Busy,

    /// The owning view was closed.
    #[error("Operation cancelled: view closed")]
    Cancelled,

    /// A bulk-action step was invoked from the wrong phase.
    #[error("Cannot {action} while {phase}")]
    InvalidState { phase: String, action: &'static str },

    // ── Remote errors ────────────────────────────────────────────────
    /// Network or service failure. `status` is `None` when no HTTP
    /// response was received.
    #[error(
        "Remote error{}: {message}",
        .status.map(|code| format!(" (HTTP {code})")).unwrap_or_default()
    )]
    Remote { status: Option<u16>, message: String },

    /// A multi-step operation stopped after some steps were applied.
    #[error("{operation} partially applied ({} completed): {message}", .completed.len())]
    PartialFailure {
        operation: &'static str,
        /// Names of the items the completed steps produced or touched.
        completed: Vec<String>,
        message: String,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// `true` for errors that were raised locally and never reached the network.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::NoContext
                | Self::Busy
                | Self::Cancelled
                | Self::InvalidState { .. }
        )
    }

    /// `true` when the service rejected the API token.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Remote { status: Some(401 | 403), .. })
    }

    /// `true` when the addressed project or group does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Remote { status: Some(404), .. })
    }

    /// `true` when no HTTP response was received at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Remote { status: None, .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<groupctl_api::Error> for CoreError {
    fn from(err: groupctl_api::Error) -> Self {
        match err {
            groupctl_api::Error::Authentication { message } => CoreError::Remote {
                status: Some(401),
                message,
            },
            groupctl_api::Error::Transport(ref e) => {
                let message = if e.is_timeout() {
                    "request timed out".to_owned()
                } else if e.is_connect() {
                    format!(
                        "cannot connect to {}: {e}",
                        e.url().map_or_else(|| "<unknown>".into(), ToString::to_string)
                    )
                } else {
                    e.to_string()
                };
                CoreError::Remote {
                    status: e.status().map(|s| s.as_u16()),
                    message,
                }
            }
            groupctl_api::Error::Timeout { timeout_secs } => CoreError::Remote {
                status: None,
                message: format!("request timed out after {timeout_secs}s"),
            },
            groupctl_api::Error::Tls(msg) => CoreError::Remote {
                status: None,
                message: format!("TLS error: {msg}"),
            },
            groupctl_api::Error::Remote {
                status, message, ..
            } => CoreError::Remote {
                status: Some(status),
                message,
            },
            groupctl_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            groupctl_api::Error::UnsupportedBaseUrl { url } => CoreError::Config {
                message: format!("Server URL cannot be used as a base: {url}"),
            },
            groupctl_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
