use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::VideoLister;
use crate::api::models::{VideoListing, VideoSummary};
use crate::config::{Config, ListingBackend};
use crate::error::{AppError, Result};

/// One page of the YouTube Data API `playlistItems.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemsPage {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub published_at: String,
    pub resource_id: Option<PlaylistItemResourceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemResourceId {
    pub video_id: Option<String>,
}

impl PlaylistItem {
    fn into_summary(self) -> Option<VideoSummary> {
        let video_id = self.snippet.resource_id?.video_id?;
        Some(VideoSummary::new(video_id, self.snippet.title, self.snippet.published_at))
    }
}

/// Something that can hand out playlist pages by continuation token.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, page_token: Option<&str>) -> Result<PlaylistItemsPage>;
}

/// Follows continuation tokens until a page comes back without one.
pub async fn collect_all_pages<S>(source: &S) -> Result<Vec<VideoSummary>>
where
    S: PageSource + ?Sized,
{
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = source.fetch_page(page_token.as_deref()).await?;
        pages += 1;
        items.extend(page.items.into_iter().filter_map(PlaylistItem::into_summary));

        match page.next_page_token.filter(|token| !token.is_empty()) {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    info!(pages, count = items.len(), "playlist listing complete");
    Ok(items)
}

/// Lists every upload of the configured playlist through the Data API.
pub struct PlaylistLister {
    client: Client,
    endpoint: String,
    playlist_id: String,
    api_key: String,
    page_size: u32,
}

impl PlaylistLister {
    pub fn new(client: Client, config: &Config) -> Result<Self> {
        let api_key = config.youtube_api_key.clone().ok_or_else(|| {
            AppError::ConfigError("YOUTUBE_API_KEY is required for the playlist backend".to_string())
        })?;

        Ok(Self {
            client,
            endpoint: format!("{}/playlistItems", config.youtube_api_base_url),
            playlist_id: config.playlist_id.clone(),
            api_key,
            page_size: config.playlist_page_size,
        })
    }
}

#[async_trait]
impl PageSource for PlaylistLister {
    async fn fetch_page(&self, page_token: Option<&str>) -> Result<PlaylistItemsPage> {
        let page_size = self.page_size.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("playlistId", self.playlist_id.as_str()),
            ("maxResults", page_size.as_str()),
            ("key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }
        debug!(page_token, "fetching playlist page");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::ListingUnavailable(format!("playlistItems request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ListingUnavailable(format!(
                "playlistItems returned HTTP {}",
                status
            )));
        }

        response
            .json::<PlaylistItemsPage>()
            .await
            .map_err(|e| AppError::ListingUnavailable(format!("invalid playlistItems response: {}", e)))
    }
}

#[async_trait]
impl VideoLister for PlaylistLister {
    fn backend(&self) -> ListingBackend {
        ListingBackend::Playlist
    }

    #[instrument(skip(self))]
    async fn list_videos(&self, _limit: Option<usize>) -> Result<Vec<VideoSummary>> {
        collect_all_pages(self).await
    }

    fn listing(&self, items: Vec<VideoSummary>) -> VideoListing {
        VideoListing::Playlist {
            playlist_id: self.playlist_id.clone(),
            count: items.len(),
            items,
        }
    }
}
