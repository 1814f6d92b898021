//! End-to-end pipeline scenarios against a mocked upstream.
//!
//! Each test stands up a wiremock server as the upstream API, points a
//! variant profile at it, and drives the dispatch → normalize → fetch
//! pipeline through `UpstreamClient`. Call-count expectations pin the
//! zero-retry and no-secondary-fetch properties.

use prompt2media_bot::bot::texts;
use prompt2media_bot::config::{VariantMode, VariantProfile};
use prompt2media_bot::upstream::{MediaKind, Staged, TurnError, UpstreamClient};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn generate_profile(base: &str) -> VariantProfile {
    let mut profile = VariantProfile::defaults_for(VariantMode::Generate);
    profile.base_url = base.trim_end_matches('/').to_string();
    profile.request_timeout = Duration::from_secs(5);
    profile.fetch_timeout = Duration::from_secs(5);
    profile
}

fn client_for(profile: &VariantProfile) -> UpstreamClient {
    UpstreamClient::new(profile, reqwest::Client::new())
}

#[tokio::test]
async fn video_url_response_is_fetched_and_ready() {
    let server = MockServer::start().await;
    let video_url = format!("{}/v.mp4", server.uri());

    Mock::given(method("GET"))
        .and(path("/generate"))
        .and(query_param("prompt", "a girl dancing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "video_url": video_url,
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v.mp4"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"fake mp4 bytes".to_vec(), "video/mp4"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&generate_profile(&server.uri()));
    let staged = client
        .begin("a girl dancing")
        .await
        .expect("turn should succeed");

    match staged {
        Staged::Ready(reply) => {
            assert_eq!(reply.kind, MediaKind::Video);
            assert_eq!(reply.bytes.as_ref(), b"fake mp4 bytes");
        }
        Staged::Pending(pending) => panic!("unexpected two-step result: {pending:?}"),
    }
}

#[tokio::test]
async fn upstream_500_produces_status_error_and_no_more_calls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&generate_profile(&server.uri()));
    let err = client
        .begin("sunset over mountains")
        .await
        .expect_err("500 must fail the turn");

    assert!(matches!(err, TurnError::UpstreamStatus { status: 500 }));
    assert!(texts::failure_text(&err).contains("500"));

    // expect(1) on the mock verifies on drop that no further calls were made
    let requests = server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn inline_video_bytes_skip_the_secondary_fetch() {
    let server = MockServer::start().await;
    let body = vec![0u8; 50_000];

    Mock::given(method("GET"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "video/mp4"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&generate_profile(&server.uri()));
    let staged = client.begin("fireworks").await.expect("turn should succeed");

    match staged {
        Staged::Ready(reply) => {
            assert_eq!(reply.kind, MediaKind::Video);
            assert_eq!(reply.bytes.len(), 50_000);
        }
        Staged::Pending(pending) => panic!("unexpected two-step result: {pending:?}"),
    }

    let requests = server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert_eq!(requests.len(), 1, "inline media must not trigger a fetch");
}

#[tokio::test]
async fn upstream_timeout_is_reported_after_a_single_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"url": "https://cdn.example/v.mp4"}))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut profile = generate_profile(&server.uri());
    profile.request_timeout = Duration::from_millis(100);

    let client = client_for(&profile);
    let err = client
        .begin("a cat playing piano")
        .await
        .expect_err("must time out");

    assert!(matches!(err, TurnError::UpstreamTimeout));
    assert!(texts::failure_text(&err).contains("timed out"));
}

#[tokio::test]
async fn two_step_id_is_completed_via_companion_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "abc123",
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/video"))
        .and(query_param("id", "abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"two step bytes".to_vec(), "video/mp4"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&generate_profile(&server.uri()));
    let staged = client.begin("a girl dancing").await.expect("first stage");

    let pending = match staged {
        Staged::Pending(pending) => pending,
        Staged::Ready(reply) => panic!("expected a pending id, got media: {:?}", reply.kind),
    };
    assert_eq!(pending.id, "abc123");

    let reply = client.complete(pending).await.expect("second stage");
    assert_eq!(reply.kind, MediaKind::Video);
    assert_eq!(reply.bytes.as_ref(), b"two step bytes");
}

#[tokio::test]
async fn upstream_error_field_is_surfaced_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "prompt contains forbidden words",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&generate_profile(&server.uri()));
    let err = client.begin("nope").await.expect_err("must surface the error");

    match &err {
        TurnError::UpstreamReported(message) => {
            assert_eq!(message, "prompt contains forbidden words");
        }
        other => panic!("expected a reported upstream error, got {other:?}"),
    }
    assert!(texts::failure_text(&err).contains("prompt contains forbidden words"));
}

#[tokio::test]
async fn failed_media_fetch_is_a_fetch_error() {
    let server = MockServer::start().await;
    let video_url = format!("{}/gone.mp4", server.uri());

    Mock::given(method("GET"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": video_url,
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&generate_profile(&server.uri()));
    let err = client.begin("a girl dancing").await.expect_err("fetch fails");
    assert!(matches!(err, TurnError::MediaFetch(_)));
}

#[tokio::test]
async fn download_variant_hits_its_own_endpoint() {
    let server = MockServer::start().await;

    let mut profile = VariantProfile::defaults_for(VariantMode::Download);
    profile.base_url = server.uri();
    profile.request_timeout = Duration::from_secs(5);
    profile.fetch_timeout = Duration::from_secs(5);

    Mock::given(method("GET"))
        .and(path("/download"))
        .and(query_param("url", "https://www.instagram.com/reel/ABC123/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![1u8; 20_000], "video/mp4"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&profile);
    let staged = client
        .begin("https://www.instagram.com/reel/ABC123/")
        .await
        .expect("download turn should succeed");

    assert!(matches!(staged, Staged::Ready(_)));
}
