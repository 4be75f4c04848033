//! Router tests against in-process fakes for the listing and transcript backends.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use channel_transcripts::api::models::{VideoListing, VideoSummary};
use channel_transcripts::api::routes::create_router;
use channel_transcripts::config::{Config, ListingBackend};
use channel_transcripts::error::{AppError, Result};
use channel_transcripts::listing::VideoLister;
use channel_transcripts::transcript::{TranscriptError, TranscriptFetcher, TranscriptSegment};
use channel_transcripts::AppState;

struct FakeLister {
    fail: bool,
    limits: Mutex<Vec<Option<usize>>>,
}

#[async_trait]
impl VideoLister for FakeLister {
    fn backend(&self) -> ListingBackend {
        ListingBackend::Feed
    }

    async fn list_videos(&self, limit: Option<usize>) -> Result<Vec<VideoSummary>> {
        self.limits.lock().unwrap().push(limit);
        if self.fail {
            return Err(AppError::FeedUnreadable("syntax error at line 1".to_string()));
        }
        let items = ["a", "b", "c"]
            .iter()
            .take(limit.unwrap_or(20))
            .map(|id| VideoSummary::new(id.to_string(), format!("Title {}", id), "2024-01-01T00:00:00+00:00".to_string()))
            .collect();
        Ok(items)
    }

    fn listing(&self, items: Vec<VideoSummary>) -> VideoListing {
        VideoListing::Channel {
            channel_id: "UCtest".to_string(),
            items,
        }
    }
}

#[derive(Clone, Copy)]
enum Outcome {
    Segments,
    Disabled,
    Broken,
}

struct FakeTranscripts {
    outcome: Outcome,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

#[async_trait]
impl TranscriptFetcher for FakeTranscripts {
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> std::result::Result<Vec<TranscriptSegment>, TranscriptError> {
        self.calls.lock().unwrap().push((video_id.to_string(), languages.to_vec()));
        match self.outcome {
            Outcome::Segments => Ok(vec![
                TranscriptSegment { text: "Hello ".to_string(), start: 0.0, duration: 1.0 },
                TranscriptSegment { text: "world".to_string(), start: 1.0, duration: 1.0 },
            ]),
            Outcome::Disabled => Err(TranscriptError::TranscriptsDisabled(video_id.to_string())),
            Outcome::Broken => Err(TranscriptError::Parse("player response truncated".to_string())),
        }
    }
}

struct Harness {
    app: Router,
    lister: Arc<FakeLister>,
    transcripts: Arc<FakeTranscripts>,
}

fn harness(outcome: Outcome, listing_fails: bool) -> Harness {
    let config = Config::from_lookup(|_| None).unwrap();
    let lister = Arc::new(FakeLister {
        fail: listing_fails,
        limits: Mutex::new(Vec::new()),
    });
    let transcripts = Arc::new(FakeTranscripts {
        outcome,
        calls: Mutex::new(Vec::new()),
    });
    let state = AppState {
        config: Arc::new(config),
        lister: lister.clone(),
        transcripts: transcripts.clone(),
    };
    Harness {
        app: create_router(state),
        lister,
        transcripts,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn transcript_text_is_returned_when_available() {
    let h = harness(Outcome::Segments, false);
    let (status, body) = get(&h.app, "/transcript?video_id=vid1&title=Sermon&url=https%3A%2F%2Fyoutu.be%2Fvid1").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        json,
        json!({
            "video_id": "vid1",
            "title": "Sermon",
            "url": "https://youtu.be/vid1",
            "text": "Hello world",
            "used_title_fallback": false
        })
    );
}

#[tokio::test]
async fn disabled_transcript_falls_back_to_title() {
    let h = harness(Outcome::Disabled, false);
    let (status, body) = get(&h.app, "/transcript?video_id=vid1&title=Grace%20%26%20Truth").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["text"], "(No transcript. Title suggests: Grace & Truth)");
    assert_eq!(json["used_title_fallback"], true);
    assert_eq!(json["url"], "");
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn backend_failure_still_answers_ok_with_error() {
    let h = harness(Outcome::Broken, false);
    let (status, body) = get(&h.app, "/transcript?video_id=vid1").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["used_title_fallback"], true);
    assert_eq!(json["text"], "(No transcript. Title suggests: )");
    assert!(!json["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn languages_default_and_keep_caller_order() {
    let h = harness(Outcome::Segments, false);
    get(&h.app, "/transcript?video_id=v1").await;
    get(&h.app, "/transcript?video_id=v2&languages=en&languages=pt").await;

    let calls = h.transcripts.calls.lock().unwrap().clone();
    assert_eq!(calls[0].1, vec!["pt-BR", "pt", "en"]);
    assert_eq!(calls[1], ("v2".to_string(), vec!["en".to_string(), "pt".to_string()]));
}

#[tokio::test]
async fn missing_video_id_is_rejected() {
    let h = harness(Outcome::Segments, false);
    let (status, _) = get(&h.app, "/transcript?title=Sermon").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(h.transcripts.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn repeated_transcript_requests_are_identical() {
    for outcome in [Outcome::Segments, Outcome::Disabled, Outcome::Broken] {
        let h = harness(outcome, false);
        let uri = "/transcript?video_id=vid1&title=Sermon&url=u";
        let first = get(&h.app, uri).await;
        let second = get(&h.app, uri).await;
        assert_eq!(first, second);
        assert_eq!(h.transcripts.calls.lock().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn videos_passes_max_items_through() {
    let h = harness(Outcome::Segments, false);
    let (status, body) = get(&h.app, "/videos?max_items=2").await;
    let (_, default_body) = get(&h.app, "/videos").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["channel_id"], "UCtest");
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["items"][0]["url"], "https://www.youtube.com/watch?v=a");

    let json: Value = serde_json::from_str(&default_body).unwrap();
    assert_eq!(json["items"].as_array().unwrap().len(), 3);
    assert_eq!(*h.lister.limits.lock().unwrap(), vec![Some(2), None]);
}

#[tokio::test]
async fn negative_max_items_is_rejected() {
    let h = harness(Outcome::Segments, false);
    let (status, _) = get(&h.app, "/videos?max_items=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unreadable_feed_is_a_client_error() {
    let h = harness(Outcome::Segments, true);
    let (status, body) = get(&h.app, "/videos").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, json!({"error": "Could not read channel feed."}));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let h = harness(Outcome::Segments, false);
    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/transcript")
                .header("Origin", "https://chat.openai.com")
                .header("Access-Control-Request-Method", "GET")
                .header("Access-Control-Request-Headers", "x-custom")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn health_reports_backend() {
    let h = harness(Outcome::Segments, false);
    let (status, body) = get(&h.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["listing_backend"], "feed");
}
