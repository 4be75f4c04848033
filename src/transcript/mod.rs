//! Transcript resolution with a title fallback.
//!
//! [`resolve`] never fails: a video without captions, or a backend that
//! misbehaves, turns into a [`TranscriptResult`] with `has_transcript == false`.
//! Only unexpected failures carry an `error` description.

pub mod youtube;

use async_trait::async_trait;
use tracing::{debug, warn};

pub use youtube::YouTubeTranscripts;

pub const DEFAULT_LANGUAGES: [&str; 3] = ["pt-BR", "pt", "en"];

/// One timed span of caption text, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("Subtitles are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("No transcript found for video {video_id} in {requested:?} (available: {available:?})")]
    NoTranscriptFound {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("Video {0} is unavailable")]
    VideoUnavailable(String),

    #[error("Video {video_id} is not playable: {reason}")]
    VideoUnplayable { video_id: String, reason: String },

    #[error("YouTube is blocking transcript requests for video {0}")]
    RequestBlocked(String),

    #[error("Transcript request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Could not parse transcript data: {0}")]
    Parse(String),
}

impl TranscriptError {
    /// Expected "no transcript" outcomes, as opposed to backend failures.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            TranscriptError::TranscriptsDisabled(_)
                | TranscriptError::NoTranscriptFound { .. }
                | TranscriptError::VideoUnavailable(_)
        )
    }
}

/// Source of caption segments. Tries `languages` in order; first match wins.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> std::result::Result<Vec<TranscriptSegment>, TranscriptError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptResult {
    pub video_id: String,
    pub text: String,
    pub has_transcript: bool,
    pub error: Option<String>,
}

impl TranscriptResult {
    pub fn found(video_id: &str, text: String) -> Self {
        Self {
            video_id: video_id.to_string(),
            text,
            has_transcript: true,
            error: None,
        }
    }

    pub fn missing(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            text: String::new(),
            has_transcript: false,
            error: None,
        }
    }

    pub fn failed(video_id: &str, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::missing(video_id)
        }
    }
}

/// Joins trimmed segment texts with single spaces, skipping blank segments.
pub fn join_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The sentence returned in place of a transcript. Callers parse this text; keep it exact.
pub fn title_fallback(title: &str) -> String {
    format!("(No transcript. Title suggests: {})", title)
}

pub async fn resolve(
    fetcher: &dyn TranscriptFetcher,
    video_id: &str,
    languages: &[String],
) -> TranscriptResult {
    match fetcher.fetch(video_id, languages).await {
        Ok(segments) => {
            debug!(video_id, segments = segments.len(), "transcript fetched");
            TranscriptResult::found(video_id, join_segments(&segments))
        }
        Err(err) if err.is_unavailable() => {
            debug!(video_id, reason = %err, "no transcript available");
            TranscriptResult::missing(video_id)
        }
        Err(err) => {
            warn!(video_id, error = %err, "transcript backend failed");
            TranscriptResult::failed(video_id, err.to_string())
        }
    }
}
