//! Caption fetching straight from YouTube.
//!
//! Three round trips: the watch page (for the innertube API key), the
//! innertube `player` endpoint (for playability and caption tracks), then the
//! chosen track's timedtext XML.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::{TranscriptError, TranscriptFetcher, TranscriptSegment};
use crate::http::fetch_text;

type Result<T> = std::result::Result<T, TranscriptError>;

const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";

static API_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("Failed to compile API key pattern")
});

static TEXT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("text").expect("Failed to parse text selector")
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    tracklist: Option<CaptionTracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTracklist {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    pub kind: Option<String>,
}

impl CaptionTrack {
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

pub struct YouTubeTranscripts {
    client: Client,
    base_url: String,
}

impl YouTubeTranscripts {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch_api_key(&self, video_id: &str) -> Result<String> {
        let url = format!("{}/watch", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("v", video_id)])
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US")
            .send()
            .await?
            .error_for_status()?;
        let html = response.text().await?;

        if html.contains(RECAPTCHA_MARKER) {
            return Err(TranscriptError::RequestBlocked(video_id.to_string()));
        }

        API_KEY_PATTERN
            .captures(&html)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| TranscriptError::Parse("INNERTUBE_API_KEY not found in watch page".to_string()))
    }

    async fn fetch_player(&self, video_id: &str, api_key: &str) -> Result<PlayerResponse> {
        let url = format!("{}/youtubei/v1/player", self.base_url);
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US")
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| TranscriptError::Parse(format!("invalid player response: {}", e)))
    }
}

#[async_trait]
impl TranscriptFetcher for YouTubeTranscripts {
    #[instrument(skip(self), fields(backend = "youtube"))]
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<Vec<TranscriptSegment>> {
        let api_key = self.fetch_api_key(video_id).await?;
        let player = self.fetch_player(video_id, &api_key).await?;
        let tracks = caption_tracks(video_id, player)?;

        let track = select_track(&tracks, languages).ok_or_else(|| TranscriptError::NoTranscriptFound {
            video_id: video_id.to_string(),
            requested: languages.to_vec(),
            available: tracks.iter().map(|t| t.language_code.clone()).collect(),
        })?;
        debug!(language = %track.language_code, generated = track.is_generated(), "caption track selected");

        let xml = fetch_text(&self.client, &track.base_url.replace("&fmt=srv3", "")).await?;
        parse_timedtext(&xml)
    }
}

/// Checks playability and pulls the caption tracks out of a player response.
fn caption_tracks(video_id: &str, player: PlayerResponse) -> Result<Vec<CaptionTrack>> {
    if let Some(status) = player.playability_status {
        let reason = status.reason.unwrap_or_default();
        match status.status.as_str() {
            "OK" => {}
            "ERROR" => return Err(TranscriptError::VideoUnavailable(video_id.to_string())),
            "LOGIN_REQUIRED" if reason.contains("bot") => {
                return Err(TranscriptError::RequestBlocked(video_id.to_string()));
            }
            other => {
                let reason = if reason.is_empty() { other.to_string() } else { reason };
                return Err(TranscriptError::VideoUnplayable {
                    video_id: video_id.to_string(),
                    reason,
                });
            }
        }
    }

    let tracks = player
        .captions
        .and_then(|captions| captions.tracklist)
        .map(|tracklist| tracklist.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(TranscriptError::TranscriptsDisabled(video_id.to_string()));
    }
    Ok(tracks)
}

/// For each language in priority order, a manual track beats a generated one.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let mut matching = tracks.iter().filter(|t| &t.language_code == lang);
        let manual = matching.clone().find(|t| !t.is_generated());
        manual.or_else(|| matching.next())
    })
}

/// Parses timedtext XML (`<transcript><text start dur>…</text></transcript>`).
pub fn parse_timedtext(xml: &str) -> Result<Vec<TranscriptSegment>> {
    if !xml.contains("<transcript") {
        return Err(TranscriptError::Parse("timedtext payload has no <transcript> root".to_string()));
    }

    let document = Html::parse_fragment(xml);
    let segments = document
        .select(&TEXT_SELECTOR)
        .map(|element| {
            let attr = |name: &str| {
                element
                    .value()
                    .attr(name)
                    .and_then(|value| value.parse::<f64>().ok())
                    .unwrap_or(0.0)
            };
            let raw: String = element.text().collect();
            TranscriptSegment {
                text: decode_markup(&raw),
                start: attr("start"),
                duration: attr("dur"),
            }
        })
        .collect();

    Ok(segments)
}

// Caption text is escaped twice; the second pass also drops inline tags like <i>.
fn decode_markup(text: &str) -> String {
    if !text.contains(['&', '<']) {
        return text.to_string();
    }
    Html::parse_fragment(text).root_element().text().collect()
}
