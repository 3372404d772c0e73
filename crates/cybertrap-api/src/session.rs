// Explicit session context handed to the client at construction.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::Error;

/// Bearer credentials for one logged-in user.
///
/// There is no refresh: once the backend starts answering 401 the session
/// is dead and the caller has to obtain a new token.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<SecretString>,
}

impl Session {
    /// A session carrying the given bearer token.
    pub fn bearer(token: SecretString) -> Self {
        Self { token: Some(token) }
    }

    /// A session with no credentials. Requests go out unauthenticated.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Default headers to install on the HTTP client.
    pub(crate) fn headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::Authentication {
                    message: format!("invalid bearer token header value: {e}"),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_has_no_header() {
        let headers = Session::anonymous().headers().unwrap_or_default();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn bearer_header_is_sensitive() {
        let session = Session::bearer(SecretString::from("tok-123"));
        let headers = session.headers().unwrap_or_default();
        let value = headers.get(AUTHORIZATION);
        assert!(value.is_some_and(HeaderValue::is_sensitive));
        assert_eq!(
            value.and_then(|v| v.to_str().ok()),
            Some("Bearer tok-123")
        );
    }

    #[test]
    fn newline_in_token_is_rejected() {
        let session = Session::bearer(SecretString::from("bad\ntoken"));
        assert!(matches!(
            session.headers(),
            Err(Error::Authentication { .. })
        ));
    }
}
