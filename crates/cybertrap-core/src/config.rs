// ── Runtime connection configuration ──
//
// Describes how to reach the backend. The CLI and TUI build one from
// the resolved profile; core never reads config files.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::view::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `https://api.example.com`.
    pub url: Url,
    /// Bearer token. `None` sends requests unauthenticated.
    pub token: Option<SecretString>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Rows per page on table views.
    pub page_size: usize,
}

impl ClientConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            token: None,
            timeout: cybertrap_api::transport::DEFAULT_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
