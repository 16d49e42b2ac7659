//! Integration tests for batch execution

use crate::integration::mock_server::MockServerFixture;
use fluent_client::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Post {
    id: u64,
}

#[tokio::test]
async fn test_batch_execution_order_preserving() {
    let mut fixture = MockServerFixture::new().await;
    for id in 1..=3 {
        fixture
            .mock_json("GET", &format!("/posts/{}", id), 200, &format!(r#"{{"id":{}}}"#, id))
            .await;
    }

    let client = fixture.client();
    let result = client
        .batch()
        .add(client.get("/posts/1"))
        .add(client.get("/posts/2"))
        .add(client.get("/posts/3"))
        .execute(&Context::background())
        .await;

    assert!(result.all_succeeded());
    assert_eq!(result.success_count(), 3);
    let ids: Vec<u64> = result
        .responses
        .iter()
        .map(|r| r.as_ref().unwrap().json::<Post>().unwrap().id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_batch_with_partial_failures() {
    let mut fixture = MockServerFixture::new().await;
    fixture.mock_json("GET", "/posts/1", 200, r#"{"id":1}"#).await;
    fixture
        .mock_json("GET", "/posts/404", 404, r#"{"message":"missing"}"#)
        .await;
    fixture.mock_json("POST", "/posts", 201, r#"{"id":7}"#).await;

    let client = fixture.client();
    let mut batch = client.batch();
    batch.extend([
        client.get("/posts/1"),
        client.get("/posts/404"),
        client.post("/posts").set_json(serde_json::json!({"title": "x"})),
    ]);

    let result = batch.execute(&Context::background()).await;
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.failure_count(), 1);
    assert!(result.errors[0].is_none());
    assert_eq!(result.errors[1].as_ref().unwrap().status_code(), 404);
    assert!(result.responses[1].is_none());

    let results = result.into_results();
    assert_eq!(results[2].as_ref().unwrap().status_code(), 201);
}
