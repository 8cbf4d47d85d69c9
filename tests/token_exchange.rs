//! Token endpoint exchange against a wiremock authorization server.

mod common;

use std::time::Duration;

use pdnd_client_assertion::error::AssertionError;
use pdnd_client_assertion::services::assertion::ComplementaryInfo;
use pdnd_client_assertion::services::oauth2::{
    OAuth2Service, PdndOAuth2Service, TokenClient, TokenRequest,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/token.oauth2";

async fn service_for(server: &MockServer) -> PdndOAuth2Service {
    let url = format!("{}{}", server.uri(), TOKEN_PATH);
    PdndOAuth2Service::from_config(common::signing_config(&url)).unwrap()
}

#[tokio::test]
async fn bearer_voucher_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains(
            "client_assertion_type=urn%3Aietf%3Aparams%3Aoauth%3Aclient-assertion-type%3Ajwt-bearer",
        ))
        .and(body_string_contains(
            "client_id=9b361d49-33f4-4f1e-a88b-4e12661f2309",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "Bearer",
            "expires_in": 3600,
            "access_token": "abc123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server).await;
    let token = service.request_access_token("a.b.c").await.unwrap();

    assert_eq!(token.token_type, "Bearer");
    assert_eq!(token.expires_in, 3600);
    assert_eq!(token.access_token, "abc123");
}

#[tokio::test]
async fn http_400_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_client"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server).await;
    let err = service.request_access_token("a.b.c").await.unwrap_err();

    match err {
        AssertionError::Transport { status, body } => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.contains("invalid_client"));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_object_is_an_empty_voucher() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let service = service_for(&server).await;
    let token = service.request_access_token("a.b.c").await.unwrap();

    assert_eq!(token.token_type, "");
    assert_eq!(token.access_token, "");
    assert_eq!(token.expires_in, 0);
}

#[tokio::test]
async fn malformed_body_is_a_format_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let service = service_for(&server).await;
    let err = service.request_access_token("a.b.c").await.unwrap_err();
    assert!(matches!(err, AssertionError::ResponseFormat(_)));
}

#[tokio::test]
async fn request_body_round_trips_through_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let service = service_for(&server).await;
    let request = service.token_request("eyJ.eyJ+/=.sig");
    service.send_token_request(&request).await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let body = String::from_utf8(received[0].body.clone()).unwrap();
    let decoded = TokenRequest::decode(&body);
    let expected: Vec<(String, String)> = request
        .fields()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(decoded, expected);
}

#[tokio::test]
async fn full_pipeline_sends_a_fresh_assertion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "Bearer",
            "expires_in": 600,
            "access_token": "voucher"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server).await;
    let token = service
        .obtain_access_token(&ComplementaryInfo::new())
        .await
        .unwrap();
    assert_eq!(token.access_token, "voucher");

    let received = server.received_requests().await.unwrap();
    let body = String::from_utf8(received[0].body.clone()).unwrap();
    let assertion = TokenRequest::decode(&body)
        .into_iter()
        .find(|(k, _)| k == "client_assertion")
        .map(|(_, v)| v)
        .unwrap();
    let payload = common::segment(&assertion, 1);
    assert_eq!(payload["sub"], "9b361d49-33f4-4f1e-a88b-4e12661f2309");
    assert_eq!(payload["digest"]["alg"], "SHA-256");
}

#[tokio::test]
async fn missing_key_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), TOKEN_PATH);
    let mut config = common::signing_config(&url);
    config.key_pem = None;
    config.key_path = None;
    let service = PdndOAuth2Service::from_config(config).unwrap();

    let err = service
        .obtain_access_token(&ComplementaryInfo::new())
        .await
        .unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn deadline_elapses_as_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = TokenClient::new(format!("{}{}", server.uri(), TOKEN_PATH))
        .unwrap()
        .with_timeout(Duration::from_millis(100));
    let err = client
        .request_access_token(&TokenRequest::new("c", "a.b.c"))
        .await
        .unwrap_err();

    assert!(matches!(err, AssertionError::Timeout(_)));
    assert!(err.is_transport());
}
