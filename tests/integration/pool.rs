//! Integration tests for the worker pool

use crate::integration::mock_server::MockServerFixture;

#[tokio::test]
async fn test_pool_submit_success() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/posts/1")
        .with_body(r#"{"id":1}"#)
        .expect(4)
        .create_async()
        .await;

    let client = fixture.client();
    let pool = client.pool(2);
    assert_eq!(pool.workers(), 2);

    let mut submissions = Vec::new();
    for _ in 0..4 {
        submissions.push(pool.submit(client.get("/posts/1")).await);
    }
    for submission in submissions {
        let resp = submission.await.unwrap();
        assert_eq!(resp.body(), br#"{"id":1}"#);
    }

    pool.wait().await;
    mock.assert_async().await;
}

#[tokio::test]
async fn test_pool_reports_failures_per_submission() {
    let mut fixture = MockServerFixture::new().await;
    fixture.mock_json("GET", "/ok", 200, "{}").await;
    fixture.mock_json("GET", "/fail", 503, "{}").await;

    let client = fixture.client();
    let pool = client.pool(0);

    let ok = pool.submit(client.get("/ok")).await;
    let fail = pool.submit(client.get("/fail")).await;
    assert!(ok.await.is_ok());
    assert_eq!(fail.await.unwrap_err().status_code(), 503);
    pool.wait().await;
}
