// Shared transport configuration for building reqwest::Client instances.
//
// Every backend call goes through a client built here, so the timeout and
// user agent live in one place.

use std::time::Duration;

use reqwest::header::HeaderMap;

/// Default per-request timeout. A hung backend call fails with
/// [`Error::Timeout`](crate::Error::Timeout) after this long.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("cybertrap/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TransportConfig {
    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::Error> {
        self.build_client_with_headers(HeaderMap::new())
    }

    /// Build a `reqwest::Client` with additional default headers.
    ///
    /// Used by [`ApiClient`](crate::ApiClient) to inject the bearer token.
    pub fn build_client_with_headers(
        &self,
        headers: HeaderMap,
    ) -> Result<reqwest::Client, crate::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(crate::Error::Transport)
    }
}
