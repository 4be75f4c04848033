//! Video listing backends behind one trait.

pub mod feed;
pub mod playlist;

use async_trait::async_trait;

use crate::api::models::{VideoListing, VideoSummary};
use crate::config::ListingBackend;
use crate::error::Result;

pub use feed::FeedLister;
pub use playlist::PlaylistLister;

#[async_trait]
pub trait VideoLister: Send + Sync {
    fn backend(&self) -> ListingBackend;

    /// `limit` caps the result where the backend supports it; `None` means its default.
    async fn list_videos(&self, limit: Option<usize>) -> Result<Vec<VideoSummary>>;

    /// Wraps listed items into the response body for this backend.
    fn listing(&self, items: Vec<VideoSummary>) -> VideoListing;
}
