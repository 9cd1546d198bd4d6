use credential_keeper::{Error, HttpTokenExchange, TokenExchange};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn exchange_posts_jwt_bearer_grant_and_parses_response() {
    let server = MockServer::start().await;
    let token_resp = serde_json::json!({
        "access_token": "cp-token",
        "token_type": "Bearer",
        "expires_in": 3600,
        "scope": "read write"
    })
    .to_string();
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion=signed-assertion"))
        .respond_with(ResponseTemplate::new(200).set_body_string(token_resp))
        .mount(&server)
        .await;

    let exchange = HttpTokenExchange::new(format!("{}/oauth/token", server.uri()));
    let response = exchange.exchange("signed-assertion").await.expect("exchange ok");

    assert_eq!(response.access_token, "cp-token");
    assert_eq!(response.token_type, "Bearer");
    assert_eq!(response.expires_in, 3600);
    assert_eq!(response.scope.as_deref(), Some("read write"));
}

#[tokio::test]
async fn missing_scope_deserializes_as_none() {
    let server = MockServer::start().await;
    let token_resp = serde_json::json!({
        "access_token": "cp-token",
        "token_type": "Bearer",
        "expires_in": 600
    })
    .to_string();
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(token_resp))
        .mount(&server)
        .await;

    let exchange = HttpTokenExchange::new(format!("{}/oauth/token", server.uri()));
    let response = exchange.exchange("signed-assertion").await.expect("exchange ok");
    assert!(response.scope.is_none());
}

#[tokio::test]
async fn non_success_status_maps_to_exchange_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let exchange = HttpTokenExchange::new(format!("{}/oauth/token", server.uri()));
    let err = exchange.exchange("signed-assertion").await.expect_err("should fail");

    match err {
        Error::Exchange(status, body) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_maps_to_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let exchange = HttpTokenExchange::new(format!("{}/oauth/token", server.uri()));
    let err = exchange.exchange("signed-assertion").await.expect_err("should fail");
    assert!(matches!(err, Error::Http(_)));
    assert_eq!(err.category(), "exchange");
}
