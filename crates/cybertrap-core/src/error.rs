// ── Core error types ──
//
// User-facing errors from cybertrap-core. Screens never match on HTTP
// details; the `From<cybertrap_api::Error>` impl folds transport
// failures into these variants.

use std::time::Duration;

use thiserror::Error;

use crate::selection::SelectionError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the backend: {reason}")]
    Network { reason: String },

    /// `timeout` is `None` when the limit was hit outside the client's
    /// own request timer (e.g. while streaming a body).
    #[error("Request timed out{}", .timeout.map(|d| format!(" after {d:?}")).unwrap_or_default())]
    Timeout { timeout: Option<Duration> },

    #[error("Session expired -- log in again")]
    SessionExpired,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Backend errors ───────────────────────────────────────────────
    #[error("Backend rejected the request (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("Unexpected response from backend: {message}")]
    Decode { message: String },

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl CoreError {
    /// Returns `true` if logging in again might resolve this error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::SessionExpired | Self::AuthenticationFailed { .. }
        )
    }

    /// Returns `true` for failures that never reached the backend.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<cybertrap_api::Error> for CoreError {
    fn from(err: cybertrap_api::Error) -> Self {
        use cybertrap_api::Error as Api;

        match err {
            Api::SessionExpired => CoreError::SessionExpired,
            Api::Authentication { message } => CoreError::AuthenticationFailed { message },
            Api::Timeout { timeout } => CoreError::Timeout {
                timeout: Some(timeout),
            },
            Api::Transport(ref e) if e.is_timeout() => CoreError::Timeout { timeout: None },
            Api::Transport(ref e) => match e.status() {
                Some(status) => CoreError::Server {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => CoreError::Network {
                    reason: e.to_string(),
                },
            },
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid backend URL: {e}"),
            },
            Api::Server { status: 404, message } => CoreError::NotFound {
                entity: "Resource".into(),
                identifier: message,
            },
            Api::Server { status, message } => CoreError::Server { status, message },
            Api::Decode { message, body: _ } => CoreError::Decode { message },
            Api::InvalidRequest(message) => CoreError::Validation { message },
        }
    }
}

impl From<SelectionError> for CoreError {
    fn from(err: SelectionError) -> Self {
        CoreError::Validation {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_core_variants() {
        let err = CoreError::from(cybertrap_api::Error::SessionExpired);
        assert!(err.is_auth_expired());

        let err = CoreError::from(cybertrap_api::Error::Timeout {
            timeout: Duration::from_millis(500),
        });
        assert_eq!(err.to_string(), "Request timed out after 500ms");
        assert!(err.is_network());

        let err = CoreError::from(cybertrap_api::Error::Server {
            status: 409,
            message: "domain already exists".into(),
        });
        assert_eq!(
            err.to_string(),
            "Backend rejected the request (HTTP 409): domain already exists"
        );

        let err = CoreError::from(cybertrap_api::Error::InvalidRequest("no domains".into()));
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn selection_errors_are_validation() {
        let err = CoreError::from(SelectionError::NoDate);
        assert_eq!(
            err.to_string(),
            "Validation failed: pick a date for the scheduled scan"
        );
    }
}
