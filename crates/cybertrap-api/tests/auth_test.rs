#![allow(clippy::unwrap_used)]
// OAuth code-exchange tests using wiremock.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cybertrap_api::auth::exchange_code;
use cybertrap_api::{Error, OAuthSettings, TransportConfig};

fn settings(server: &MockServer, secret: Option<&str>) -> OAuthSettings {
    OAuthSettings {
        domain: Url::parse(&server.uri()).unwrap(),
        client_id: "client-1".into(),
        client_secret: secret.map(|s| SecretString::from(s.to_owned())),
        redirect_uri: "http://localhost:3000/callback".into(),
    }
}

#[tokio::test]
async fn test_exchange_code_success() {
    let server = MockServer::start().await;

    // base64("client-1:shh") == "Y2xpZW50LTE6c2ho"
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header("authorization", "Basic Y2xpZW50LTE6c2ho"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=abc123"))
        .and(body_string_contains("client_id=client-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-xyz",
            "id_token": "id-xyz",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = exchange_code(
        &settings(&server, Some("shh")),
        " abc123 ",
        &TransportConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(tokens.access_token.expose_secret(), "access-xyz");
    assert_eq!(tokens.expires_in, Some(3600));
    assert!(tokens.refresh_token.is_none());
}

#[tokio::test]
async fn test_exchange_code_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "code expired"
        })))
        .mount(&server)
        .await;

    let err = exchange_code(&settings(&server, None), "old", &TransportConfig::default())
        .await
        .unwrap_err();

    match err {
        Error::Authentication { message } => assert_eq!(message, "invalid_grant: code expired"),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_exchange_blank_code_is_rejected_locally() {
    let server = MockServer::start().await;
    let result = exchange_code(&settings(&server, None), "  ", &TransportConfig::default()).await;
    assert!(matches!(result, Err(Error::InvalidRequest(_))));
}
