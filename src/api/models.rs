use serde::{Deserialize, Serialize};

use crate::transcript::{title_fallback, TranscriptResult, DEFAULT_LANGUAGES};
use crate::video_id::watch_url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub video_id: String,
    pub title: String,
    pub published: String,
    pub url: String,
}

impl VideoSummary {
    pub fn new(video_id: String, title: String, published: String) -> Self {
        let url = watch_url(&video_id);
        Self {
            video_id,
            title,
            published,
            url,
        }
    }
}

/// Body of `GET /videos`; the shape depends on the active listing backend.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum VideoListing {
    Channel {
        channel_id: String,
        items: Vec<VideoSummary>,
    },
    Playlist {
        playlist_id: String,
        count: usize,
        items: Vec<VideoSummary>,
    },
}

#[derive(Debug, Deserialize)]
pub struct ListVideosQuery {
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptQuery {
    pub video_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

fn default_languages() -> Vec<String> {
    DEFAULT_LANGUAGES.iter().map(|lang| lang.to_string()).collect()
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub text: String,
    pub used_title_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranscriptResponse {
    /// Title and url are echoed from the request as given.
    pub fn compose(query: TranscriptQuery, result: TranscriptResult) -> Self {
        let (text, used_title_fallback) = if result.has_transcript {
            (result.text, false)
        } else {
            (title_fallback(&query.title), true)
        };

        Self {
            video_id: query.video_id,
            title: query.title,
            url: query.url,
            text,
            used_title_fallback,
            error: result.error,
        }
    }
}
