use std::time::Duration;

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

use resumen_core::{
    Config, Endpoints, Pipeline, ResumenError, RetryPolicy, Timeouts,
    config::PushoverConfig,
};

fn test_config(server: &ServerGuard) -> Config {
    let url = server.url();
    Config {
        youtube_api_key: "yt-key".to_string(),
        transcript_token: "apify-token".to_string(),
        gemini_api_key: "gemini-key".to_string(),
        readwise_token: "readwise-token".to_string(),
        pushover: Some(PushoverConfig {
            token: "po-token".to_string(),
            user: "po-user".to_string(),
        }),
        telegram_bot_token: Some("test-token".to_string()),
        playlist_id: "PLtest".to_string(),
        gemini_model: "gemini-2.0-flash".to_string(),
        transcript_actor: "test~actor".to_string(),
        transcript_provider_retries: 1,
        endpoints: Endpoints {
            youtube_api: url.clone(),
            transcript_api: url.clone(),
            gemini_api: url.clone(),
            readwise_api: url.clone(),
            pushover_api: url.clone(),
            telegram_api: url.clone(),
        },
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
        },
        timeouts: Timeouts::default(),
    }
}

const GEMINI_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";
const TRANSCRIPT_PATH: &str = "/v2/acts/test~actor/run-sync-get-dataset-items";

fn playlist_body() -> String {
    json!({
        "items": [
            {
                "contentDetails": {"videoId": "vidAAA1"},
                "snippet": {"title": "First Video", "videoOwnerChannelTitle": "Channel A"}
            },
            {
                "contentDetails": {"videoId": "vidBBB2"},
                "snippet": {"title": "Second Video", "videoOwnerChannelTitle": "Channel B"}
            }
        ]
    })
    .to_string()
}

fn gemini_success(text: &str) -> String {
    json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}).to_string()
}

#[tokio::test]
async fn batch_run_keeps_playlist_order_despite_reordered_transcripts() {
    let mut server = Server::new_async().await;
    let config = test_config(&server);

    let _playlist = server
        .mock("GET", "/playlistItems")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(playlist_body())
        .create_async()
        .await;

    // The provider answers in the opposite order, but with ids.
    let _transcripts = server
        .mock("POST", TRANSCRIPT_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!([
                {"videoId": "vidBBB2", "captions": [{"text": "second transcript"}]},
                {"videoId": "vidAAA1", "captions": [{"text": "first transcript"}]}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let _gemini = server
        .mock("POST", GEMINI_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(gemini_success("<h2>LEVEL 1: Executive Summary</h2>"))
        .expect(2)
        .create_async()
        .await;

    // The persisted document must list sections in playlist order, each
    // section pairing its own transcript.
    let readwise = server
        .mock("POST", "/api/v3/save/")
        .match_body(Matcher::Regex(
            "(?s)First Video.*first transcript.*Second Video.*second transcript".to_string(),
        ))
        .with_status(201)
        .with_body(json!({"id": 123, "url": "https://example.com/saved/123"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let _pushover = server
        .mock("POST", "/1/messages.json")
        .with_status(200)
        .with_body("{}")
        .expect(2)
        .create_async()
        .await;

    let pipeline = Pipeline::new(config).unwrap();
    let confirmation = pipeline.run_batch().await.expect("run succeeds");

    assert_eq!(confirmation.id, Some(123));
    readwise.assert_async().await;
}

#[tokio::test]
async fn batch_run_with_always_rejecting_summarizer_fails_with_one_error_notification() {
    let mut server = Server::new_async().await;
    let config = test_config(&server);

    let _playlist = server
        .mock("GET", "/playlistItems")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(playlist_body())
        .create_async()
        .await;

    let _transcripts = server
        .mock("POST", TRANSCRIPT_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!([
                {"videoId": "vidAAA1", "text": "first transcript"},
                {"videoId": "vidBBB2", "text": "second transcript"}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    // Explicit provider error on every attempt: rejected outright, per
    // video, with no retries.
    let gemini = server
        .mock("POST", GEMINI_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"error": {"message": "prompt rejected"}}).to_string())
        .expect(2)
        .create_async()
        .await;

    // Newer mocks match first, so the catch-all goes in before the
    // "Error"-matching mock that counts failure notifications.
    let _pushover_any = server
        .mock("POST", "/1/messages.json")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let pushover_error = server
        .mock("POST", "/1/messages.json")
        .match_body(Matcher::Regex("Error".to_string()))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let pipeline = Pipeline::new(config).unwrap();
    let err = pipeline.run_batch().await.expect_err("run fails");

    assert!(matches!(err, ResumenError::ProviderRejected { .. }));
    gemini.assert_async().await;
    pushover_error.assert_async().await;
}

#[tokio::test]
async fn single_run_notifies_each_phase() {
    let mut server = Server::new_async().await;
    let config = test_config(&server);

    let _video = server
        .mock("GET", "/videos")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({
                "items": [
                    {"id": "vidAAA1", "snippet": {"title": "First Video", "channelTitle": "Channel A"}}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let _transcripts = server
        .mock("POST", TRANSCRIPT_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!([{"videoId": "vidAAA1", "text": "the transcript"}]).to_string())
        .create_async()
        .await;

    let _gemini = server
        .mock("POST", GEMINI_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(gemini_success("<h2>LEVEL 1: Executive Summary</h2>"))
        .create_async()
        .await;

    let _readwise = server
        .mock("POST", "/api/v3/save/")
        .with_status(201)
        .with_body(json!({"id": 7}).to_string())
        .create_async()
        .await;

    // Resolution, fetch, summarize, save, done: five chat replies.
    let telegram = server
        .mock("POST", "/bottest-token/sendMessage")
        .with_status(200)
        .with_body("{}")
        .expect(5)
        .create_async()
        .await;

    let pipeline = Pipeline::new(config).unwrap();
    let confirmation = pipeline
        .run_single("https://www.youtube.com/watch?v=vidAAA1", "chat-42")
        .await
        .expect("run succeeds");

    assert_eq!(confirmation.id, Some(7));
    telegram.assert_async().await;
}

#[tokio::test]
async fn single_run_rejects_bad_urls_before_any_network_call() {
    let server = Server::new_async().await;
    let mut config = test_config(&server);
    config.telegram_bot_token = None;

    // No mocks registered: any request would 501 and fail differently.
    let pipeline = Pipeline::new(config).unwrap();
    let err = pipeline
        .run_single("https://example.com/not-youtube", "chat-42")
        .await
        .expect_err("validation fails");

    assert!(matches!(err, ResumenError::Validation { .. }));
}

#[tokio::test]
async fn upstream_transcript_error_aborts_the_run() {
    let mut server = Server::new_async().await;
    let mut config = test_config(&server);
    config.pushover = None;

    let _playlist = server
        .mock("GET", "/playlistItems")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(playlist_body())
        .create_async()
        .await;

    let _transcripts = server
        .mock("POST", TRANSCRIPT_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("actor crashed")
        .create_async()
        .await;

    let pipeline = Pipeline::new(config).unwrap();
    let err = pipeline.run_batch().await.expect_err("run fails");

    assert!(matches!(err, ResumenError::Upstream { .. }));
}
