//! Per-user throttling over the wire

mod harness;

use harness::config::ConfigBuilder;
use harness::mock_tts::MockTts;
use harness::server::TestServer;
use serde_json::json;

/// Two short items that never share a batch, so each becomes its own
/// throttled unit
fn two_units() -> serde_json::Value {
    json!([
        {"text": "Hello there", "metadata": {"user": "a"}},
        {"text": "How are you", "metadata": {"user": "b"}}
    ])
}

#[tokio::test]
async fn anonymous_callers_are_never_throttled() {
    let mock = MockTts::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).with_throttle(0, 0).build();
    let server = TestServer::start(config).await.unwrap();

    let (status, body) = server
        .speak(&json!({"items": [{"text": "Hello there"}]}))
        .await
        .unwrap();

    assert_eq!(status, 200);
    assert_eq!(body["units"][0]["status"], "synthesized");
}

#[tokio::test]
async fn unit_over_the_day_limit_is_skipped() {
    let mock = MockTts::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url())
        .with_throttle(1000, 1)
        .build();
    let server = TestServer::start(config).await.unwrap();

    let (status, body) = server
        .speak(&json!({"items": two_units(), "user_id": "user-1"}))
        .await
        .unwrap();

    assert_eq!(status, 200);
    let units = body["units"].as_array().unwrap();
    assert_eq!(units.len(), 2);

    let skipped: Vec<_> = units.iter().filter(|u| u["status"] == "skipped").collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0]["reason"], "Exceeded per-day limit: 2/1");
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn request_on_the_limit_is_still_allowed() {
    let mock = MockTts::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url())
        .with_throttle(1000, 2)
        .build();
    let server = TestServer::start(config).await.unwrap();

    let (_, body) = server
        .speak(&json!({"items": two_units(), "user_id": "user-1"}))
        .await
        .unwrap();

    for unit in body["units"].as_array().unwrap() {
        assert_eq!(unit["status"], "synthesized");
    }

    // The third call for the same user crosses the limit
    let (_, body) = server
        .speak(&json!({"items": [{"text": "Hello there"}], "user_id": "user-1"}))
        .await
        .unwrap();
    assert_eq!(body["units"][0]["status"], "skipped");
    assert_eq!(body["units"][0]["reason"], "Exceeded per-day limit: 3/2");
}

#[tokio::test]
async fn limits_are_tracked_per_user() {
    let mock = MockTts::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url())
        .with_throttle(1000, 1)
        .build();
    let server = TestServer::start(config).await.unwrap();

    let (_, body) = server
        .speak(&json!({"items": [{"text": "Hello there"}], "user_id": "user-1"}))
        .await
        .unwrap();
    assert_eq!(body["units"][0]["status"], "synthesized");

    // A different user has their own counters
    let (_, body) = server
        .speak(&json!({"items": [{"text": "Hello there"}], "user_id": "user-2"}))
        .await
        .unwrap();
    assert_eq!(body["units"][0]["status"], "synthesized");
}
