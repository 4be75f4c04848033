pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod listing;
pub mod transcript;
pub mod video_id;

use std::sync::Arc;
use config::{Config, ListingBackend};
use error::Result;
use listing::{FeedLister, PlaylistLister, VideoLister};
use transcript::{TranscriptFetcher, YouTubeTranscripts};

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub lister: Arc<dyn VideoLister>,
    pub transcripts: Arc<dyn TranscriptFetcher>,
}

impl AppState {
    /// Wires the configured listing backend and the YouTube transcript fetcher.
    pub fn from_config(config: Config) -> Result<Self> {
        let client = http::build_client(&config)?;

        let lister: Arc<dyn VideoLister> = match config.listing_backend {
            ListingBackend::Feed => Arc::new(FeedLister::new(client.clone(), &config)),
            ListingBackend::Playlist => Arc::new(PlaylistLister::new(client.clone(), &config)?),
        };
        let transcripts = Arc::new(YouTubeTranscripts::new(client, config.youtube_base_url.clone()));

        Ok(AppState {
            config: Arc::new(config),
            lister,
            transcripts,
        })
    }
}
