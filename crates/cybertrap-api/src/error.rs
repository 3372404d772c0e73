use std::time::Duration;

use thiserror::Error;

/// Coarse classification used by callers that only care about the
/// failure family (network trouble vs. backend refusal vs. bad payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request never reached the backend or never came back.
    Network,
    /// The backend answered with a non-2xx status.
    Server,
    /// The backend answered 2xx but the body could not be decoded.
    Decode,
}

/// Top-level error type for the `cybertrap-api` crate.
///
/// Every operation on [`ApiClient`](crate::ApiClient) fails with one of
/// these. No variant is ever retried by this crate.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The bearer token was rejected (HTTP 401).
    #[error("Session expired -- log in again")]
    SessionExpired,

    /// Token could not be attached or the OAuth exchange failed.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request exceeded the configured timeout.
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-2xx response from the backend.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Decode { message: String, body: String },

    /// Caller supplied something the backend would reject anyway.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// Which failure family this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(e) if e.is_decode() => ErrorCategory::Decode,
            Self::Transport(e) if e.status().is_some() => ErrorCategory::Server,
            Self::Transport(_) | Self::Timeout { .. } | Self::InvalidUrl(_) => {
                ErrorCategory::Network
            }
            Self::Decode { .. } => ErrorCategory::Decode,
            Self::SessionExpired
            | Self::Authentication { .. }
            | Self::Server { .. }
            | Self::InvalidRequest(_) => ErrorCategory::Server,
        }
    }

    /// Returns `true` if logging in again might resolve this error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::Authentication { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Server { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::SessionExpired => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Map a reqwest failure, promoting timeouts to [`Error::Timeout`].
    pub(crate) fn from_send(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout }
        } else {
            Self::Transport(err)
        }
    }
}
