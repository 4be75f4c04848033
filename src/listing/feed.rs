use async_trait::async_trait;
use chrono::SecondsFormat;
use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::Client;
use tracing::{debug, instrument};

use super::VideoLister;
use crate::api::models::{VideoListing, VideoSummary};
use crate::config::{Config, ListingBackend};
use crate::error::{AppError, Result};
use crate::http::fetch_text;
use crate::video_id::{extract_id, FeedEntry};

const YOUTUBE_ENTRY_ID_PREFIX: &str = "yt:video:";

/// Lists the newest videos from the channel's public Atom feed.
pub struct FeedLister {
    client: Client,
    channel_id: String,
    feed_url: String,
    default_limit: usize,
}

impl FeedLister {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            channel_id: config.channel_id.clone(),
            feed_url: format!(
                "{}/feeds/videos.xml?channel_id={}",
                config.youtube_base_url, config.channel_id
            ),
            default_limit: config.feed_max_items_default,
        }
    }

    async fn fetch_entries(&self) -> Result<Vec<FeedEntry>> {
        let body = fetch_text(&self.client, &self.feed_url)
            .await
            .map_err(|e| AppError::FeedUnreadable(format!("fetch {}: {}", self.feed_url, e)))?;
        let feed = parser::parse(body.as_bytes())
            .map_err(|e| AppError::FeedUnreadable(format!("parse {}: {}", self.feed_url, e)))?;
        debug!(entries = feed.entries.len(), "channel feed parsed");

        Ok(feed.entries.iter().map(FeedEntry::from).collect())
    }
}

#[async_trait]
impl VideoLister for FeedLister {
    fn backend(&self) -> ListingBackend {
        ListingBackend::Feed
    }

    #[instrument(skip(self))]
    async fn list_videos(&self, limit: Option<usize>) -> Result<Vec<VideoSummary>> {
        let entries = self.fetch_entries().await?;
        Ok(summarize_entries(entries, limit.unwrap_or(self.default_limit)))
    }

    fn listing(&self, items: Vec<VideoSummary>) -> VideoListing {
        VideoListing::Channel {
            channel_id: self.channel_id.clone(),
            items,
        }
    }
}

/// Takes the first `limit` entries in feed order, dropping any without a video id.
pub fn summarize_entries<I>(entries: I, limit: usize) -> Vec<VideoSummary>
where
    I: IntoIterator<Item = FeedEntry>,
{
    entries
        .into_iter()
        .take(limit)
        .filter_map(|entry| {
            let Some(video_id) = extract_id(&entry) else {
                debug!(link = ?entry.link, "skipping feed entry without a video id");
                return None;
            };
            Some(VideoSummary::new(
                video_id,
                entry.title.unwrap_or_default(),
                entry.published.unwrap_or_default(),
            ))
        })
        .collect()
}

impl From<&Entry> for FeedEntry {
    fn from(entry: &Entry) -> Self {
        let video_id = entry
            .id
            .strip_prefix(YOUTUBE_ENTRY_ID_PREFIX)
            .map(str::to_string);

        let link = entry
            .links
            .iter()
            .find(|link| link.rel.as_deref() == Some("alternate"))
            .or_else(|| entry.links.first())
            .map(|link| link.href.clone());

        FeedEntry {
            video_id,
            link,
            title: entry.title.as_ref().map(|t| t.content.clone()),
            published: entry
                .published
                .or(entry.updated)
                .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, false)),
        }
    }
}
