//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use groupctl_config::ConfigError;
use groupctl_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PARTIAL: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the group service: {reason}")]
    #[diagnostic(
        code(groupctl::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             For self-signed certificates use --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(groupctl::auth_failed),
        help(
            "Verify the API token and that it may manage groups in this project.\n\
             Run: groupctl config set-token"
        )
    )]
    AuthFailed { message: String },

    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(groupctl::no_credentials),
        help(
            "Configure one with: groupctl config init\n\
             Or set the GROUPCTL_API_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(groupctl::not_found),
        help("Run: groupctl {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("The server has no such resource: {message}")]
    #[diagnostic(
        code(groupctl::remote_not_found),
        help("Check the project (--project) and the server URL.")
    )]
    RemoteNotFound { message: String },

    #[error("No project selected")]
    #[diagnostic(
        code(groupctl::no_project),
        help("Pass --project, set GROUPCTL_PROJECT, or add `project` to your profile.")
    )]
    NoProject,

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(groupctl::api_error))]
    ApiError { code: String, message: String },

    #[error("{operation} only partly applied: {message}")]
    #[diagnostic(
        code(groupctl::partial_failure),
        help(
            "Already applied: {completed}\n\
             List the groups again before retrying."
        )
    )]
    PartialFailure {
        operation: String,
        completed: String,
        message: String,
    },

    #[error("{message}")]
    #[diagnostic(code(groupctl::aborted))]
    Aborted { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(groupctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(groupctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: groupctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(groupctl::no_config),
        help(
            "Create one with: groupctl config init\n\
             Or pass --server and --api-token.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(groupctl::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(groupctl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(groupctl::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(groupctl::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::RemoteNotFound { .. } => exit_code::NOT_FOUND,
            Self::PartialFailure { .. } => exit_code::PARTIAL,
            Self::Validation { .. }
            | Self::NoProject
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, message } => CliError::Validation {
                field: field.into(),
                reason: message,
            },

            CoreError::NoContext => CliError::NoProject,

            CoreError::Remote { status, message } => match status {
                Some(401 | 403) => CliError::AuthFailed { message },
                Some(404) => CliError::RemoteNotFound { message },
                None => CliError::ConnectionFailed { reason: message },
                Some(code) => CliError::ApiError {
                    code: code.to_string(),
                    message,
                },
            },

            CoreError::PartialFailure {
                operation,
                completed,
                message,
            } => CliError::PartialFailure {
                operation: operation.into(),
                completed: if completed.is_empty() {
                    "(nothing)".into()
                } else {
                    completed.join(", ")
                },
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },

            other @ (CoreError::Busy | CoreError::Cancelled | CoreError::InvalidState { .. }) => {
                CliError::Aborted {
                    message: other.to_string(),
                }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(io) => CliError::Io(io),
            other => CliError::Config(other),
        }
    }
}
