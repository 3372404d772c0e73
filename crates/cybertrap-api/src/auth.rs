// OAuth2 authorization-code helpers for the hosted identity provider.
//
// The provider exposes `{domain}/login` for the browser leg and
// `{domain}/oauth2/token` for the code exchange. Tokens are never refreshed
// here; callers persist the access token and log in again when it expires.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{Error, TransportConfig};

/// Identity-provider settings for one profile.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    /// Base URL of the hosted login domain.
    pub domain: Url,
    pub client_id: String,
    pub client_secret: Option<SecretString>,
    pub redirect_uri: String,
}

/// Successful response from the token endpoint.
#[derive(Debug, Clone)]
pub struct TokenResponse {
    pub access_token: SecretString,
    pub id_token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
    pub expires_in: Option<u64>,
    pub token_type: Option<String>,
}

#[derive(Deserialize)]
struct RawTokenResponse {
    access_token: String,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

impl From<RawTokenResponse> for TokenResponse {
    fn from(raw: RawTokenResponse) -> Self {
        Self {
            access_token: SecretString::from(raw.access_token),
            id_token: raw.id_token.map(SecretString::from),
            refresh_token: raw.refresh_token.map(SecretString::from),
            expires_in: raw.expires_in,
            token_type: raw.token_type,
        }
    }
}

#[derive(Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

fn endpoint(domain: &Url, path: &str) -> Result<Url, Error> {
    let base = domain.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}/{path}"))?)
}

/// URL the user opens in a browser to start the login.
pub fn authorize_url(settings: &OAuthSettings) -> Result<Url, Error> {
    let mut url = endpoint(&settings.domain, "login")?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &settings.client_id)
        .append_pair("redirect_uri", &settings.redirect_uri);
    Ok(url)
}

/// Exchange an authorization code for tokens.
pub async fn exchange_code(
    settings: &OAuthSettings,
    code: &str,
    transport: &TransportConfig,
) -> Result<TokenResponse, Error> {
    let code = code.trim();
    if code.is_empty() {
        return Err(Error::InvalidRequest("authorization code is empty".into()));
    }

    let url = endpoint(&settings.domain, "oauth2/token")?;
    debug!("POST {url}");

    let http = transport.build_client()?;
    let mut req = http.post(url).form(&[
        ("grant_type", "authorization_code"),
        ("client_id", settings.client_id.as_str()),
        ("code", code),
        ("redirect_uri", settings.redirect_uri.as_str()),
    ]);
    if let Some(secret) = &settings.client_secret {
        req = req.basic_auth(&settings.client_id, Some(secret.expose_secret()));
    }

    let resp = req
        .send()
        .await
        .map_err(|e| Error::from_send(e, transport.timeout))?;
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<OAuthErrorResponse>(&body).map_or_else(
            |_| format!("token endpoint returned HTTP {status}"),
            |e| match e.error_description {
                Some(desc) => format!("{}: {desc}", e.error),
                None => e.error,
            },
        );
        return Err(Error::Authentication { message });
    }

    serde_json::from_str::<RawTokenResponse>(&body)
        .map(TokenResponse::from)
        .map_err(|e| Error::Decode {
            message: format!("invalid token response: {e}"),
            body,
        })
}
