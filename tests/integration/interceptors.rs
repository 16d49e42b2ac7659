//! Interceptors wired through client configuration

use crate::integration::mock_server::MockServerFixture;
use fluent_client::{Client, HeaderInterceptor, LoggingInterceptor, RetryInterceptor};
use std::time::Duration;

#[tokio::test]
async fn test_header_interceptor_applies_to_every_request() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/intercepted")
        .match_header("x-request-source", "interceptor")
        .with_body("{}")
        .expect(2)
        .create_async()
        .await;

    let client = Client::new(
        fixture
            .config()
            .with_interceptor(LoggingInterceptor)
            .with_interceptor(HeaderInterceptor::new().with_header("X-Request-Source", "interceptor")),
    )
    .unwrap();

    client.get("/intercepted").result().await.unwrap();
    client.get("/intercepted").result().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_retry_interceptor_retries_server_errors() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/flaky")
        .match_body("again")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let client = Client::new(
        fixture
            .config()
            .with_interceptor(RetryInterceptor::new(2, Duration::ZERO)),
    )
    .unwrap();

    let err = client
        .post("/flaky")
        .set_body("again")
        .result()
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 503);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_retry_interceptor_leaves_client_errors_alone() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/missing")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let client = Client::new(
        fixture
            .config()
            .with_interceptor(RetryInterceptor::new(3, Duration::ZERO)),
    )
    .unwrap();

    let err = client.get("/missing").result().await.unwrap_err();
    assert_eq!(err.status_code(), 404);
    mock.assert_async().await;
}
