//! Single-request behaviour against a mock server

use crate::integration::mock_server::MockServerFixture;
use fluent_client::{Config, Error};
use mockito::Matcher;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Post {
    id: u64,
    title: String,
    user_id: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewPost {
    title: String,
    body: String,
    user_id: u64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[tokio::test]
async fn test_get_decodes_json() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json("GET", "/posts/1", 200, r#"{"id":1,"title":"Test Post","userId":1}"#)
        .await;

    let post: Post = fixture.client().get("/posts/1").into().await.unwrap();
    assert_eq!(
        post,
        Post {
            id: 1,
            title: "Test Post".to_string(),
            user_id: 1
        }
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_not_found_decodes_error_detail() {
    let mut fixture = MockServerFixture::new().await;
    fixture
        .mock_json("GET", "/posts/999", 404, r#"{"message":"Post not found"}"#)
        .await;

    let err = fixture
        .client()
        .get("/posts/999")
        .set_error::<ApiError>()
        .result()
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 404);
    assert!(err.is_status());
    assert!(!err.is_retryable());
    let status = err.as_status().unwrap();
    assert_eq!(status.detail::<ApiError>().unwrap().message, "Post not found");
    assert_eq!(err.response_body(), Some(&br#"{"message":"Post not found"}"#[..]));

    let message = err.to_string();
    assert!(message.contains("status=404"), "{}", message);
    assert!(message.contains("method=GET"), "{}", message);
    assert!(message.contains("Post not found"), "{}", message);
}

#[tokio::test]
async fn test_undecodable_error_body_keeps_plain_failure() {
    let mut fixture = MockServerFixture::new().await;
    fixture
        .mock_json("GET", "/broken", 500, "<html>oops</html>")
        .await;

    let err = fixture
        .client()
        .get("/broken")
        .set_error::<ApiError>()
        .result()
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 500);
    assert!(err.is_retryable());
    assert!(err.as_status().unwrap().detail.is_none());
    assert!(err
        .to_string()
        .ends_with("request failed with status code 500"));
}

#[tokio::test]
async fn test_post_json_round_trip() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/posts")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "title": "foo",
            "body": "bar",
            "userId": 1
        })))
        .with_status(201)
        .with_body(r#"{"id":101,"title":"foo","userId":1}"#)
        .create_async()
        .await;

    let created: Post = fixture
        .client()
        .post("/posts")
        .set_json(NewPost {
            title: "foo".to_string(),
            body: "bar".to_string(),
            user_id: 1,
        })
        .into()
        .await
        .unwrap();

    assert_eq!(created.id, 101);
    mock.assert_async().await;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Envelope {
    name: String,
    tags: Vec<String>,
    score: Option<f64>,
    nested: Option<Box<Envelope>>,
}

#[tokio::test]
async fn test_json_round_trip_across_shapes() {
    let mut fixture = MockServerFixture::new().await;
    let client = fixture.client();
    let shapes = vec![
        json!(null),
        json!(42),
        json!("héllo wörld ✓ 日本語"),
        json!([1, "two", null, [3.5, []]]),
        json!({"a": {"b": {"c": [true, false]}}, "empty": {}, "list": [], "none": null}),
    ];

    for (i, shape) in shapes.into_iter().enumerate() {
        let path = format!("/echo/{}", i);
        let mock = fixture
            .server
            .mock("POST", path.as_str())
            .match_body(Matcher::Json(shape.clone()))
            .with_header("content-type", "application/json")
            .with_body(shape.to_string())
            .create_async()
            .await;

        let echoed: Value = client.post(&path).set_json(shape.clone()).into().await.unwrap();
        assert_eq!(echoed, shape, "shape {}", i);
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_json_round_trip_typed_value() {
    let mut fixture = MockServerFixture::new().await;
    let sent = Envelope {
        name: "ünïcödé \"quoted\" \u{1F600}".to_string(),
        tags: vec!["a".to_string(), String::new()],
        score: None,
        nested: Some(Box::new(Envelope {
            name: "inner".to_string(),
            tags: Vec::new(),
            score: Some(-0.25),
            nested: None,
        })),
    };
    let wire = serde_json::to_value(&sent).unwrap();
    let mock = fixture
        .server
        .mock("PUT", "/envelopes/1")
        .match_body(Matcher::Json(wire.clone()))
        .with_body(wire.to_string())
        .create_async()
        .await;

    let echoed: Envelope = fixture
        .client()
        .put("/envelopes/1")
        .set_json(sent.clone())
        .into()
        .await
        .unwrap();
    assert_eq!(echoed, sent);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_query_params_are_merged() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/posts")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("userId".into(), "1".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
        ]))
        .with_body("[]")
        .create_async()
        .await;

    let resp = fixture
        .client()
        .get("/posts?userId=1&page=1")
        .set_query_param("page", "2")
        .set_query_params([("limit", "10")])
        .result()
        .await
        .unwrap();

    assert_eq!(resp.text().unwrap(), "[]");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_headers_layer_over_globals() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/headers")
        .match_header("x-global", "global")
        .match_header("x-trace", "request")
        .match_header("accept", "application/json")
        .with_body("{}")
        .create_async()
        .await;

    let client = fluent_client::Client::new(
        fixture
            .config()
            .with_global_header("X-Global", "global")
            .with_global_header("X-Trace", "global"),
    )
    .unwrap();
    let resp = client
        .get("/headers")
        .set_header("X-Trace", "request")
        .result()
        .await
        .unwrap();

    assert!(resp.is_success());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_execute_hits_network_once() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/once")
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let mut req = fixture.client().get("/once");
    let first = req.execute().await.unwrap().body().to_vec();
    let second = req.execute().await.unwrap().body().to_vec();
    assert_eq!(first, second);

    let resp = req.result().await.unwrap();
    assert_eq!(resp.body(), &first[..]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_raw_body_is_sent_verbatim() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("PUT", "/notes/1")
        .match_header("content-type", "text/plain")
        .match_body("plain note")
        .with_status(204)
        .create_async()
        .await;

    let resp = fixture
        .client()
        .put("/notes/1")
        .set_header("Content-Type", "text/plain")
        .set_body("plain note")
        .result()
        .await
        .unwrap();

    assert_eq!(resp.status_code(), 204);
    assert!(resp.body().is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_reader_body_is_drained() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("PATCH", "/upload")
        .match_body("streamed bytes")
        .with_body("{}")
        .create_async()
        .await;

    let reader = std::io::Cursor::new(b"streamed bytes".to_vec());
    fixture
        .client()
        .patch("/upload")
        .set_reader(reader)
        .result()
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_decode_failure_on_success_body() {
    let mut fixture = MockServerFixture::new().await;
    fixture
        .mock_json("GET", "/posts/1", 200, r#"{"unexpected":true}"#)
        .await;

    let err = fixture
        .client()
        .get("/posts/1")
        .into::<Post>()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
    assert_eq!(err.status_code(), 0);
}

#[tokio::test]
async fn test_delete_with_callbacks() {
    let mut fixture = MockServerFixture::new().await;
    fixture.mock_json("DELETE", "/posts/1", 200, "{}").await;

    let (tx, rx) = std::sync::mpsc::channel();
    let resp = fixture
        .client()
        .delete("/posts/1")
        .on_success(move |resp| tx.send(resp.status_code()).unwrap())
        .on_error(|err| panic!("unexpected failure: {}", err))
        .result()
        .await
        .unwrap();

    assert_eq!(resp.status_code(), 200);
    assert_eq!(rx.try_recv().unwrap(), 200);
}

#[tokio::test]
async fn test_endpoint_used_verbatim_without_base_url() {
    let mut fixture = MockServerFixture::new().await;
    fixture.mock_json("GET", "/absolute", 200, "{}").await;

    let client = fluent_client::Client::new(Config::new()).unwrap();
    let resp = client
        .get(&format!("{}/absolute", fixture.base_url))
        .result()
        .await
        .unwrap();
    assert!(resp.is_success());
}
