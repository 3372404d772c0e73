//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and distinct exit codes.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use cybertrap_config::ConfigError;
use cybertrap_core::{CoreError, SelectionError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend")]
    #[diagnostic(
        code(cybertrap::connection_failed),
        help(
            "Check that the backend is running and the URL is right.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out{}", .timeout.map(|d| format!(" after {d:?}")).unwrap_or_default())]
    #[diagnostic(
        code(cybertrap::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { timeout: Option<Duration> },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Session expired or token rejected")]
    #[diagnostic(
        code(cybertrap::session_expired),
        help("Log in again with: cybertrap login --profile {profile}")
    )]
    SessionExpired { profile: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(cybertrap::auth_failed),
        help("Check the [profiles.{profile}.oauth] settings, then run: cybertrap login")
    )]
    AuthFailed { profile: String, message: String },

    #[error("No token configured for profile '{profile}'")]
    #[diagnostic(
        code(cybertrap::no_credentials),
        help(
            "Log in with: cybertrap login\n\
             Or store one with: cybertrap config set-token\n\
             Or set the CYBERTRAP_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(cybertrap::not_found),
        help("Run: cybertrap {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Backend rejected the request (HTTP {status}): {message}")]
    #[diagnostic(code(cybertrap::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected response from backend: {message}")]
    #[diagnostic(
        code(cybertrap::decode),
        help("Re-run with -vv to log the raw response.")
    )]
    Decode { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(cybertrap::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(cybertrap::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: cybertrap config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(cybertrap::no_config),
        help(
            "Create a config with: cybertrap config init\n\
             Or pass --api-url.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(cybertrap::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Prompt failed: {0}")]
    #[diagnostic(
        code(cybertrap::prompt),
        help("Use --yes (-y) or pass values as flags in non-interactive contexts.")
    )]
    Prompt(String),

    #[error("Operation cancelled")]
    #[diagnostic(code(cybertrap::cancelled))]
    Cancelled,

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::SessionExpired { .. } | Self::AuthFailed { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ApiError { status: 409, .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::Prompt(_) => exit_code::USAGE,
            Self::Config(ConfigError::NoCredentials { .. }) => exit_code::AUTH,
            _ => exit_code::GENERAL,
        }
    }

    /// Convert a core error, naming `profile` in auth hints.
    pub fn from_core(err: CoreError, profile: &str) -> Self {
        match err {
            CoreError::SessionExpired => Self::SessionExpired {
                profile: profile.into(),
            },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed {
                profile: profile.into(),
                message,
            },
            other => Self::from(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Network { reason } => CliError::ConnectionFailed { reason },
            CoreError::Timeout { timeout } => CliError::Timeout { timeout },
            CoreError::SessionExpired => CliError::SessionExpired {
                profile: "default".into(),
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "default".into(),
                message,
            },
            CoreError::Server { status, message } => CliError::ApiError { status, message },
            CoreError::NotFound { entity, identifier } => CliError::NotFound {
                list_command: list_command_for(&entity),
                resource_type: entity,
                identifier,
            },
            CoreError::Decode { message } => CliError::Decode { message },
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Cancelled => CliError::Cancelled,
        }
    }
}

impl From<SelectionError> for CliError {
    fn from(err: SelectionError) -> Self {
        CliError::Validation {
            field: "selection".into(),
            reason: err.to_string(),
        }
    }
}

fn list_command_for(entity: &str) -> String {
    match entity.to_ascii_lowercase().as_str() {
        "domain" => "domains list".into(),
        "scheduled scan" => "schedule list".into(),
        "template" => "templates list".into(),
        _ => "scans list".into(),
    }
}
