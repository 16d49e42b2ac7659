//! Deadlines and cancellation against a server that never answers

use crate::integration::mock_server::{init_tracing, silent_server};
use fluent_client::{Client, Config, Context, Error, TransportError};
use std::time::{Duration, Instant};

async fn silent_client() -> Client {
    init_tracing();
    Client::new(Config::new().with_base_url(silent_server().await)).unwrap()
}

#[tokio::test]
async fn test_deadline_exceeded() {
    let client = silent_client().await;
    let (ctx, _cancel) = Context::background().with_timeout(Duration::from_millis(100));

    let start = Instant::now();
    let err = client
        .get_with_context(&ctx, "/slow")
        .result()
        .await
        .unwrap_err();

    assert!(err.is_deadline_exceeded(), "{}", err);
    assert!(!err.is_retryable());
    assert_eq!(err.status_code(), 0);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_cancel_in_flight() {
    let client = silent_client().await;
    let (ctx, cancel) = Context::background().with_cancel();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let err = client
        .post_with_context(&ctx, "/slow")
        .set_body("payload")
        .result()
        .await
        .unwrap_err();
    assert!(err.is_canceled(), "{}", err);
}

#[tokio::test]
async fn test_batch_context_bounds_every_request() {
    let client = silent_client().await;
    let (ctx, _cancel) = Context::background().with_timeout(Duration::from_millis(100));

    let result = client
        .batch()
        .add(client.get("/a"))
        .add(client.get("/b"))
        .execute(&ctx)
        .await;

    assert_eq!(result.failure_count(), 2);
    assert!(result
        .errors
        .iter()
        .all(|e| e.as_ref().unwrap().is_deadline_exceeded()));
}

#[tokio::test]
async fn test_client_timeout_applies() {
    init_tracing();
    let client = Client::new(
        Config::new()
            .with_base_url(silent_server().await)
            .with_timeout(Duration::from_millis(100)),
    )
    .unwrap();

    let err = client.get("/slow").result().await.unwrap_err();
    assert!(matches!(
        &err,
        Error::Transport {
            source: TransportError::Timeout(_),
            ..
        }
    ));
    assert!(err.is_retryable());
}
